use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Days, FixedOffset, NaiveTime, TimeZone};
use pricing_cache_keys::DailySuggestionKey;
use pricing_demand::Clock;
use pricing_errors::StorageError;
use pricing_forecast::{ForecastEngine, SuggestionCache};
use pricing_models::PrecomputeReport;
use tracing::{info, instrument, warn};

/// Warms the daily suggestion cache for a rolling horizon.
#[derive(Clone)]
pub struct PrecomputeJob {
    forecast: ForecastEngine,
    cache: SuggestionCache,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl PrecomputeJob {
    pub fn new(
        forecast: ForecastEngine, cache: SuggestionCache, clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            forecast,
            cache,
            clock,
            ttl,
        }
    }

    /// Computes and caches the daily suggestion of every category for
    /// `today .. today + days`, one at a time. A failing pair is logged and
    /// skipped.
    #[instrument(skip(self))]
    pub async fn precompute_next_days(
        &self, days: u32,
    ) -> Result<PrecomputeReport, StorageError> {
        let categories = self.forecast.store().list_categories().await?;
        let today = self.clock.now().date_naive();

        let mut report = PrecomputeReport {
            days,
            categories: categories.len(),
            ..Default::default()
        };

        for offset in 0..days {
            let Some(date) = today.checked_add_days(Days::new(offset.into()))
            else {
                break;
            };

            for &category_id in &categories {
                let suggestion =
                    match self.forecast.suggest_for_date(category_id, date).await
                    {
                        Ok(suggestion) => suggestion,
                        Err(e) => {
                            warn!(category_id, %date, error = %e, "precompute failed");
                            report.failed += 1;
                            continue;
                        }
                    };

                let key = DailySuggestionKey::new(category_id, date).to_string();
                match self.cache.set_with_ttl(&key, &suggestion, self.ttl).await {
                    Ok(()) => report.cached += 1,
                    Err(e) => {
                        warn!(%key, error = %e, "precompute cache write failed");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            days,
            categories = report.categories,
            cached = report.cached,
            failed = report.failed,
            "precompute complete"
        );

        Ok(report)
    }
}

/// Time left until the next occurrence of `hour:00` in `now`'s offset. An
/// exact match schedules the following day.
pub fn delay_until_hour(now: DateTime<FixedOffset>, hour: u32) -> Duration {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at);

    let mut next = now.timezone().from_local_datetime(&today).single();
    if next.is_none_or(|next| next <= now) {
        next = now
            .date_naive()
            .succ_opt()
            .map(|tomorrow| tomorrow.and_time(at))
            .and_then(|t| now.timezone().from_local_datetime(&t).single());
    }

    next.and_then(|next| (next - now).to_std().ok())
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}
