use std::{fmt, time::Duration};

use chrono::NaiveDate;
use pricing_models::CategoryId;

const PREFIX: &str = "price_suggestion";

/// Daily suggestions live for a day.
pub const DAILY_SUGGESTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Range suggestions are cheap to recompute and go stale fast.
pub const RANGE_SUGGESTION_TTL: Duration = Duration::from_secs(5 * 60);

/// `price_suggestion:{category}:{date}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailySuggestionKey {
    pub category_id: CategoryId,
    pub date: NaiveDate,
}

impl DailySuggestionKey {
    pub fn new(category_id: CategoryId, date: NaiveDate) -> Self {
        Self { category_id, date }
    }
}

impl fmt::Display for DailySuggestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}:{}:{}", self.category_id, self.date)
    }
}

/// `price_suggestion:{category}:{from}:{to}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeSuggestionKey {
    pub category_id: CategoryId,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl RangeSuggestionKey {
    pub fn new(category_id: CategoryId, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            category_id,
            from,
            to,
        }
    }
}

impl fmt::Display for RangeSuggestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}:{}:{}:{}", self.category_id, self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        let from = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 7, 9).unwrap();

        assert_eq!(
            DailySuggestionKey::new(3, from).to_string(),
            "price_suggestion:3:2025-07-04"
        );
        assert_eq!(
            RangeSuggestionKey::new(3, from, to).to_string(),
            "price_suggestion:3:2025-07-04:2025-07-09"
        );
    }
}
