use std::time::Duration;

use chrono::NaiveDate;
use pricing_cache_keys::{
    DAILY_SUGGESTION_TTL, DailySuggestionKey, RANGE_SUGGESTION_TTL,
    RangeSuggestionKey,
};
use pricing_errors::PricingError;
use pricing_models::{CategoryId, PriceSuggestion};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{ForecastEngine, SuggestionCache};

/// Forecast read for a category starting at `from`. Without `to` the read
/// is for the single night `[from, from + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriceForecastQuery {
    pub category_id: CategoryId,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionTtls {
    pub daily: Duration,
    pub range: Duration,
}

impl Default for SuggestionTtls {
    fn default() -> Self {
        Self {
            daily: DAILY_SUGGESTION_TTL,
            range: RANGE_SUGGESTION_TTL,
        }
    }
}

/// Cache-first forecast reads.
///
/// Cache failures count as misses. When the computation itself fails on
/// storage, the list price is served instead and nothing is cached.
#[derive(Clone)]
pub struct ForecastQueryHandler {
    engine: ForecastEngine,
    cache: SuggestionCache,
    ttls: SuggestionTtls,
}

impl ForecastQueryHandler {
    pub fn new(
        engine: ForecastEngine, cache: SuggestionCache, ttls: SuggestionTtls,
    ) -> Self {
        Self {
            engine,
            cache,
            ttls,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self, query: PriceForecastQuery,
    ) -> Result<PriceSuggestion, PricingError> {
        let PriceForecastQuery {
            category_id,
            from,
            to,
        } = query;
        if category_id <= 0 {
            return Err(PricingError::InvalidCategory(category_id));
        }
        let next_day = from
            .succ_opt()
            .ok_or(PricingError::InvalidRange { from, to: from })?;
        let to = to.unwrap_or(next_day);
        if to <= from {
            return Err(PricingError::InvalidRange { from, to });
        }
        let daily = to == next_day;

        let (key, ttl) = if daily {
            (
                DailySuggestionKey::new(category_id, from).to_string(),
                self.ttls.daily,
            )
        }
        else {
            (
                RangeSuggestionKey::new(category_id, from, to).to_string(),
                self.ttls.range,
            )
        };

        match self.cache.try_get(&key).await {
            Ok(Some(suggestion)) => {
                debug!(%key, "forecast cache hit");
                return Ok(suggestion);
            }
            Ok(None) => debug!(%key, "forecast cache miss"),
            Err(e) => warn!(%key, error = %e, "forecast cache read failed"),
        }

        let computed = if daily {
            self.engine.suggest_for_date(category_id, from).await
        }
        else {
            self.engine.suggest_price(category_id, from, to).await
        };

        match computed {
            Ok(suggestion) => {
                if let Err(e) =
                    self.cache.set_with_ttl(&key, &suggestion, ttl).await
                {
                    warn!(%key, error = %e, "forecast cache write failed");
                }
                Ok(suggestion)
            }
            Err(PricingError::Storage(e)) => {
                warn!(category_id, error = %e, "forecast degraded to base price");
                self.base_price_fallback(category_id, from, to).await
            }
            Err(e) => Err(e),
        }
    }

    async fn base_price_fallback(
        &self, category_id: CategoryId, from: NaiveDate, to: NaiveDate,
    ) -> Result<PriceSuggestion, PricingError> {
        let prices = self
            .engine
            .store()
            .category_prices(category_id)
            .await?
            .ok_or(PricingError::CategoryNotFound(category_id))?;

        Ok(PriceSuggestion::at_base_price(
            category_id,
            from,
            to,
            prices.base_price,
        ))
    }
}
