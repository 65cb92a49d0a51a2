use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Source of holiday dates that earn a price boost.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Fixed list of dates, usually read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl StaticHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Parses a comma separated `YYYY-MM-DD` list. Blank items are skipped.
    pub fn parse(list: &str) -> Result<Self, chrono::ParseError> {
        let dates = list
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| NaiveDate::parse_from_str(item, "%Y-%m-%d"))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { dates })
    }

    pub fn dates(&self) -> impl Iterator<Item = &NaiveDate> { self.dates.iter() }

    pub fn len(&self) -> usize { self.dates.len() }

    pub fn is_empty(&self) -> bool { self.dates.is_empty() }
}

impl HolidayCalendar for StaticHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool { self.dates.contains(&date) }
}
