use std::sync::Arc;

use chrono::NaiveDate;
use pricing_dao::PricingStore;
use pricing_errors::PricingError;
use pricing_models::{CategoryId, CategoryPrices, PriceSuggestion};
use pricing_rules::{
    HOLIDAY_BOOST, HolidayCalendar, occupancy_multiplier, occupancy_rate,
    round2,
};
use tracing::{debug, instrument};

/// Computes suggested prices from stored inventory, bookings and prices.
#[derive(Clone)]
pub struct ForecastEngine {
    store: Arc<dyn PricingStore>,
    holidays: Arc<dyn HolidayCalendar>,
}

impl ForecastEngine {
    pub fn new(
        store: Arc<dyn PricingStore>, holidays: Arc<dyn HolidayCalendar>,
    ) -> Self {
        Self { store, holidays }
    }

    pub fn store(&self) -> &Arc<dyn PricingStore> { &self.store }

    /// Occupancy-only suggestion over the nights `[from, to)`.
    #[instrument(skip(self))]
    pub async fn suggest_price(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<PriceSuggestion, PricingError> {
        Ok(self.occupancy(category_id, from, to).await?.0)
    }

    /// Daily suggestion, the one cached under the per-date key.
    ///
    /// The occupancy tier, the live demand ratio `round2(current / base)`
    /// and the holiday boost compound into a single multiplier:
    /// `round2(occupancy × demand × holiday)`.
    #[instrument(skip(self))]
    pub async fn suggest_for_date(
        &self, category_id: CategoryId, date: NaiveDate,
    ) -> Result<PriceSuggestion, PricingError> {
        let to = date
            .succ_opt()
            .ok_or(PricingError::InvalidRange { from: date, to: date })?;
        let holiday = self.holidays.is_holiday(date);

        let (mut suggestion, prices) =
            self.occupancy(category_id, date, to).await?;
        suggestion.holiday = holiday;
        let Some(prices) = prices else {
            return Ok(suggestion);
        };

        // The ratio is kept at price precision before it compounds.
        let demand = round2(prices.demand_ratio());
        let boost = if holiday { HOLIDAY_BOOST } else { 1.0 };
        let multiplier = round2(suggestion.multiplier * demand * boost);

        suggestion.multiplier = multiplier;
        suggestion.suggested_price = round2(prices.base_price * multiplier);
        debug!(
            category_id,
            %date,
            multiplier,
            holiday,
            suggested_price = suggestion.suggested_price,
            "daily suggestion"
        );

        Ok(suggestion)
    }

    /// Shared occupancy pass. Prices are `None` when the category has no
    /// units and the zero-valued suggestion was returned.
    async fn occupancy(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<(PriceSuggestion, Option<CategoryPrices>), PricingError> {
        if category_id <= 0 {
            return Err(PricingError::InvalidCategory(category_id));
        }
        if to <= from {
            return Err(PricingError::InvalidRange { from, to });
        }

        let unit_count = self.store.unit_count(category_id).await?;
        if unit_count == 0 {
            return Ok((PriceSuggestion::empty(category_id, from, to), None));
        }

        let booked = self
            .store
            .booked_unit_nights(category_id, from, to)
            .await?;
        let possible = (to - from).num_days() * unit_count;
        let rate = occupancy_rate(booked, possible);

        let prices = self
            .store
            .category_prices(category_id)
            .await?
            .ok_or(PricingError::CategoryNotFound(category_id))?;

        let multiplier = occupancy_multiplier(rate);
        let suggestion = PriceSuggestion::builder()
            .category_id(category_id)
            .date(from)
            .to_date(to)
            .unit_count(unit_count)
            .booked_unit_nights(booked)
            .possible_unit_nights(possible)
            .occupancy_rate(rate)
            .base_price(prices.base_price)
            .multiplier(multiplier)
            .suggested_price(round2(prices.base_price * multiplier))
            .build();

        Ok((suggestion, Some(prices)))
    }
}
