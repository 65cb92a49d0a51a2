//! Demand-driven repricing: recompute cycles, the immediate trigger on
//! search bursts and the forecast precompute job.

pub mod config;
mod engine;
mod precompute;

pub use config::PricingConfig;
pub use engine::PricingEngine;
pub use precompute::{PrecomputeJob, delay_until_hour};
