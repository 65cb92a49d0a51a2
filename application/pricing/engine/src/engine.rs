use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use pricing_cache_keys::DailySuggestionKey;
use pricing_dao::PricingStore;
use pricing_demand::{Clock, DemandTracker};
use pricing_errors::StorageError;
use pricing_forecast::SuggestionCache;
use pricing_models::{
    CategoryId, CategoryOutcome, CategoryStats, CycleReport, PriceAction,
    PricingStats, SearchSignal, TriggerOutcome,
};
use pricing_rules::{night_adjusted, surge_multiplier};
use tracing::{debug, error, info, instrument, warn};

use crate::config::PricingConfig;

#[derive(Debug, Default)]
struct UpdateLog {
    global: Option<DateTime<Utc>>,
    per_category: BTreeMap<CategoryId, DateTime<Utc>>,
}

/// Owns the demand signals of one service instance and turns them into
/// persisted prices.
///
/// Recompute cycles, periodic or triggered by a search burst, are
/// serialized by an async lock so their prune, count, write and reset steps
/// never interleave. Concurrent writers outside the engine still race on
/// the stored price, and the last write wins.
pub struct PricingEngine {
    tracker: DemandTracker,
    store: Arc<dyn PricingStore>,
    cache: SuggestionCache,
    config: PricingConfig,
    updates: Mutex<UpdateLog>,
    cycle: tokio::sync::Mutex<()>,
}

impl PricingEngine {
    pub fn new(
        store: Arc<dyn PricingStore>, cache: SuggestionCache,
        clock: Arc<dyn Clock>, config: PricingConfig,
    ) -> Self {
        Self {
            tracker: DemandTracker::new(clock),
            store,
            cache,
            config,
            updates: Mutex::new(UpdateLog::default()),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    pub fn tracker(&self) -> &DemandTracker { &self.tracker }

    pub fn config(&self) -> &PricingConfig { &self.config }

    fn clock(&self) -> &Arc<dyn Clock> { self.tracker.clock() }

    fn updates(&self) -> MutexGuard<'_, UpdateLog> {
        self.updates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Local calendar date.
    pub fn today(&self) -> NaiveDate { self.clock().now().date_naive() }

    /// One periodic pass over every category.
    ///
    /// A failing category is logged and listed in the report, the others
    /// still get repriced. Global demand state is cleared at the end.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<CycleReport, StorageError> {
        let _cycle = self.cycle.lock().await;
        let now = self.clock().now();
        let today = now.date_naive();

        self.tracker.prune(self.config.window());
        let recent_requests = self.tracker.count(None);

        let available_units = self.store.available_units(None, today).await?;
        let surge = surge_multiplier(recent_requests, available_units);
        let categories = self.store.list_categories().await?;

        let mut report = CycleReport {
            recent_requests,
            available_units,
            surge_multiplier: surge,
            ..Default::default()
        };

        for category_id in categories {
            let recent = self.tracker.count(Some(category_id));
            match self
                .recompute_category(category_id, recent, today, now.hour())
                .await
            {
                Ok(Some(outcome)) => report.outcomes.push(outcome),
                Ok(None) => report.failed_categories.push(category_id),
                Err(e) => {
                    error!(category_id, error = %e, "category repricing failed");
                    report.failed_categories.push(category_id);
                }
            }
        }

        self.tracker.reset();
        self.updates().global = Some(self.clock().now_utc());

        info!(
            recent_requests,
            available_units,
            surge_multiplier = surge,
            repriced = report.outcomes.len(),
            failed = report.failed_categories.len(),
            "pricing cycle complete"
        );

        Ok(report)
    }

    /// Records an availability search and, on a burst, reprices at once.
    ///
    /// A burst is a global recent count at or over the threshold. It drops
    /// the search date's cached suggestions for every category, reprices
    /// each category whose own window also crossed the threshold and then
    /// clears the global state so the same burst does not fire twice.
    #[instrument(skip(self, signal), fields(category_id = ?signal.category_id))]
    pub async fn record_search(&self, signal: &SearchSignal) -> TriggerOutcome {
        self.tracker.record_search(signal);

        let window = self.config.window();
        let recent_requests = self.tracker.recent(None, window);
        if recent_requests < self.config.trigger_threshold {
            return TriggerOutcome {
                recent_requests,
                ..Default::default()
            };
        }

        let _cycle = self.cycle.lock().await;
        let now = self.clock().now();
        let today = now.date_naive();
        let search_date = signal.search_date.unwrap_or(today);
        info!(recent_requests, %search_date, "demand burst, repricing now");

        match self.store.list_categories().await {
            Ok(categories) => {
                for category_id in categories {
                    let key = DailySuggestionKey::new(category_id, search_date);
                    self.invalidate(&key.to_string()).await;
                }
            }
            Err(e) => warn!(error = %e, "could not list categories to invalidate"),
        }

        self.tracker.prune(window);
        let mut repriced_categories = Vec::new();
        for category_id in self.tracker.categories() {
            let recent = self.tracker.count(Some(category_id));
            if recent < self.config.trigger_threshold {
                continue;
            }
            match self
                .recompute_category(category_id, recent, today, now.hour())
                .await
            {
                Ok(Some(_)) => repriced_categories.push(category_id),
                Ok(None) => {}
                Err(e) => {
                    error!(category_id, error = %e, "category repricing failed")
                }
            }
            self.tracker.take_category(category_id);
        }

        self.tracker.reset();
        self.updates().global = Some(self.clock().now_utc());

        TriggerOutcome {
            recent_requests,
            triggered: true,
            repriced_categories,
        }
    }

    /// Apply or reset the price of one category, then drop today's cached
    /// suggestion for it. `None` when the store has no such category.
    async fn recompute_category(
        &self, category_id: CategoryId, recent_requests: usize,
        today: NaiveDate, hour: u32,
    ) -> Result<Option<CategoryOutcome>, StorageError> {
        let available_units =
            self.store.available_units(Some(category_id), today).await?;
        let multiplier = night_adjusted(
            surge_multiplier(recent_requests, available_units),
            hour,
        );

        let (action, found) =
            if recent_requests >= self.config.trigger_threshold {
                let found = self
                    .store
                    .apply_current_price(category_id, multiplier)
                    .await?;
                (PriceAction::Applied, found)
            }
            else {
                let found = self.store.reset_current_price(category_id).await?;
                (PriceAction::Reset, found)
            };
        if !found {
            warn!(category_id, recent_requests, "no such room category, skipped");
            return Ok(None);
        }

        self.updates()
            .per_category
            .insert(category_id, self.clock().now_utc());
        debug!(
            category_id,
            recent_requests,
            available_units,
            multiplier,
            ?action,
            "category repriced"
        );

        let key = DailySuggestionKey::new(category_id, today);
        self.invalidate(&key.to_string()).await;

        Ok(Some(CategoryOutcome {
            category_id,
            recent_requests,
            available_units,
            multiplier,
            action,
        }))
    }

    async fn invalidate(&self, key: &str) {
        if let Err(e) = self.cache.remove(key).await {
            warn!(%key, error = %e, "cache invalidation failed");
        }
    }

    /// Diagnostics view. Stale events are pruned first so the counts are
    /// current.
    pub fn stats(&self) -> PricingStats {
        self.tracker.prune(self.config.window());
        let snapshot = self.tracker.snapshot();
        let updates = self.updates();

        let per_category = snapshot
            .per_category
            .iter()
            .map(|(category_id, recent_requests)| CategoryStats {
                category_id: *category_id,
                recent_requests: *recent_requests,
                last_updated: updates.per_category.get(category_id).copied(),
            })
            .collect();

        PricingStats {
            pricing_window_seconds: self.config.window_seconds,
            pricing_trigger_threshold: self.config.trigger_threshold,
            global_recent_requests: snapshot.global,
            distinct_requesters: snapshot.distinct_requesters,
            returned_rooms: snapshot.returned_rooms,
            per_category,
            last_global_update: updates.global,
            last_category_updates: updates.per_category.clone(),
        }
    }
}
