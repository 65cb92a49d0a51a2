use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::CategoryId;

/// List price and currently effective price of a category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrices {
    pub base_price: f64,
    pub current_price: Option<f64>,
}

impl CategoryPrices {
    /// `current / base`, or 1.0 when either side is missing or zero.
    pub fn demand_ratio(&self) -> f64 {
        match self.current_price {
            Some(current) if current > 0.0 && self.base_price > 0.0 => {
                current / self.base_price
            }
            _ => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PriceAction {
    /// Surged price written
    Applied,
    /// Base price restored
    Reset,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryOutcome {
    pub category_id: CategoryId,
    pub recent_requests: usize,
    pub available_units: i64,
    pub multiplier: f64,
    pub action: PriceAction,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CycleReport {
    pub recent_requests: usize,
    pub available_units: i64,
    pub surge_multiplier: f64,
    pub outcomes: Vec<CategoryOutcome>,
    /// Categories whose update failed and was skipped
    pub failed_categories: Vec<CategoryId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrecomputeReport {
    pub days: u32,
    pub categories: usize,
    pub cached: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryStats {
    pub category_id: CategoryId,
    pub recent_requests: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Diagnostics for the admin dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingStats {
    pub pricing_window_seconds: u64,
    pub pricing_trigger_threshold: usize,
    pub global_recent_requests: usize,
    pub distinct_requesters: usize,
    pub returned_rooms: u64,
    pub per_category: Vec<CategoryStats>,
    pub last_global_update: Option<DateTime<Utc>>,
    #[schema(value_type = Object)]
    pub last_category_updates: BTreeMap<CategoryId, DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_ratio() {
        let surged = CategoryPrices {
            base_price: 200.0,
            current_price: Some(250.0),
        };
        let unset = CategoryPrices {
            base_price: 200.0,
            current_price: None,
        };
        let free = CategoryPrices {
            base_price: 0.0,
            current_price: Some(10.0),
        };

        assert_eq!(surged.demand_ratio(), 1.25);
        assert_eq!(unset.demand_ratio(), 1.0);
        assert_eq!(free.demand_ratio(), 1.0);
    }
}
