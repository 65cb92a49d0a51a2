mod reports;
mod signals;
mod suggestion;

pub use reports::{
    CategoryOutcome, CategoryPrices, CategoryStats, CycleReport,
    PrecomputeReport, PriceAction, PricingStats,
};
pub use signals::{SearchSignal, TriggerOutcome};
pub use suggestion::PriceSuggestion;

/// Identifier of a room category (room type).
pub type CategoryId = i64;
