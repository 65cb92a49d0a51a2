//! Occupancy-based price suggestions and their cached read path.

mod engine;
mod query;

use std::sync::Arc;

pub use engine::ForecastEngine;
use pricing_models::PriceSuggestion;
pub use query::{ForecastQueryHandler, PriceForecastQuery, SuggestionTtls};
use redis_connection::CacheTrait;

/// Cache shared by the forecast reader, the precompute job and the
/// invalidation path.
pub type SuggestionCache = Arc<dyn CacheTrait<Value = PriceSuggestion>>;
