use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::CategoryId;

/// One availability search, as reported by the booking front-end.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchSignal {
    /// Category the guest filtered on, if any
    #[serde(default, alias = "room_type_id")]
    pub category_id: Option<CategoryId>,
    /// Authenticated requester, used for distinct-requester counting
    #[serde(default)]
    pub requester_id: Option<String>,
    /// Categories of the rooms the search returned. Each one is counted
    /// when no explicit category was given.
    #[serde(default)]
    pub result_categories: Vec<CategoryId>,
    /// Requested check-in date; defaults to today
    #[serde(default)]
    pub search_date: Option<NaiveDate>,
}

/// What the immediate trigger did after a search was recorded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriggerOutcome {
    pub recent_requests: usize,
    pub triggered: bool,
    #[serde(default)]
    pub repriced_categories: Vec<CategoryId>,
}
