use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

use crate::CategoryId;

/// Suggested nightly price for a category, derived from occupancy and
/// demand. Cached per day and per range.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder, ToSchema,
)]
pub struct PriceSuggestion {
    pub category_id: CategoryId,
    /// First night of the range
    pub date: NaiveDate,
    /// Exclusive end of the range
    pub to_date: NaiveDate,
    #[builder(default)]
    pub unit_count: i64,
    #[builder(default)]
    pub booked_unit_nights: i64,
    #[builder(default)]
    pub possible_unit_nights: i64,
    #[builder(default, setter(strip_option))]
    pub occupancy_rate: Option<f64>,
    pub base_price: f64,
    #[builder(default = 1.0)]
    pub multiplier: f64,
    pub suggested_price: f64,
    #[builder(default)]
    pub holiday: bool,
}

impl PriceSuggestion {
    /// Suggestion for a category with no physical units.
    pub fn empty(
        category_id: CategoryId, date: NaiveDate, to_date: NaiveDate,
    ) -> Self {
        Self::builder()
            .category_id(category_id)
            .date(date)
            .to_date(to_date)
            .occupancy_rate(0.0)
            .base_price(0.0)
            .suggested_price(0.0)
            .build()
    }

    /// Suggestion that repeats the list price, used when demand data is
    /// unavailable.
    pub fn at_base_price(
        category_id: CategoryId, date: NaiveDate, to_date: NaiveDate,
        base_price: f64,
    ) -> Self {
        Self::builder()
            .category_id(category_id)
            .date(date)
            .to_date(to_date)
            .base_price(base_price)
            .suggested_price(base_price)
            .build()
    }
}
