use std::{sync::Arc, time::Duration};

use chrono::TimeDelta;
use pricing_demand::ManualClock;
use pricing_engine::{PricingConfig, PricingEngine, PrecomputeJob};
use pricing_forecast::{ForecastEngine, SuggestionCache};
use pricing_models::{PriceAction, PriceSuggestion, SearchSignal};
use pricing_rules::StaticHolidays;
use redis_connection::{CacheTrait, MemoryCache};
use test_utils::{InMemoryPricingStore, day};

struct Harness {
    store: Arc<InMemoryPricingStore>,
    cache: Arc<MemoryCache<PriceSuggestion>>,
    clock: Arc<ManualClock>,
    engine: PricingEngine,
}

fn harness(store: InMemoryPricingStore, now: &str) -> Harness {
    let store = Arc::new(store);
    let cache = Arc::new(MemoryCache::default());
    let clock = Arc::new(ManualClock::at(now).unwrap());
    let engine = PricingEngine::new(
        store.clone(),
        cache.clone(),
        clock.clone(),
        PricingConfig::default(),
    );

    Harness {
        store,
        cache,
        clock,
        engine,
    }
}

async fn seed(cache: &MemoryCache<PriceSuggestion>, key: &str, price: f64) {
    let suggestion =
        PriceSuggestion::at_base_price(1, day("2025-06-01"), day("2025-06-02"), price);
    cache
        .set_with_ttl(key, &suggestion, Duration::from_secs(3600))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_below_threshold_resets_to_base_and_invalidates_today() {
    let h = harness(
        InMemoryPricingStore::new().with_category(1, 100.0, 4),
        "2025-06-01T12:00:00+00:00",
    );
    h.store.set_current_price(1, Some(150.0));
    seed(&h.cache, "price_suggestion:1:2025-06-01", 150.0).await;
    seed(&h.cache, "price_suggestion:1:2025-06-02", 150.0).await;
    h.engine.tracker().record(Some(1));

    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].action, PriceAction::Reset);
    assert_eq!(h.store.current_price(1), Some(100.0));
    assert!(!h.cache.exists("price_suggestion:1:2025-06-01").await.unwrap());
    // Only today's entry is dropped
    assert!(h.cache.exists("price_suggestion:1:2025-06-02").await.unwrap());
}

#[tokio::test]
async fn test_burst_at_night_applies_surcharged_surge() {
    let h = harness(
        InMemoryPricingStore::new().with_category(1, 1000.0, 2),
        "2025-06-01T22:00:00+00:00",
    );
    for _ in 0..5 {
        h.engine.tracker().record(Some(1));
    }

    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.recent_requests, 5);
    assert_eq!(report.available_units, 2);
    assert_eq!(report.surge_multiplier, 1.25);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.action, PriceAction::Applied);
    assert_eq!(outcome.multiplier, 1.44);
    assert_eq!(h.store.current_price(1), Some(1440.0));
    // Global state is cleared for the next window
    assert_eq!(h.engine.tracker().count(None), 0);
}

#[tokio::test]
async fn test_stale_demand_does_not_surge() {
    let h = harness(
        InMemoryPricingStore::new().with_category(1, 1000.0, 2),
        "2025-06-01T12:00:00+00:00",
    );
    for _ in 0..5 {
        h.engine.tracker().record(Some(1));
    }
    h.clock.advance(TimeDelta::seconds(61));

    let report = h.engine.run_cycle().await.unwrap();

    assert_eq!(report.recent_requests, 0);
    assert_eq!(report.outcomes[0].action, PriceAction::Reset);
    assert_eq!(h.store.current_price(1), Some(1000.0));
}

#[tokio::test]
async fn test_failing_category_does_not_abort_cycle() {
    let h = harness(
        InMemoryPricingStore::new()
            .with_category(1, 100.0, 2)
            .with_category(2, 200.0, 2)
            .with_category(3, 300.0, 2),
        "2025-06-01T12:00:00+00:00",
    );
    h.store.fail_category(2);

    let report = h.engine.run_cycle().await.unwrap();

    let repriced: Vec<_> =
        report.outcomes.iter().map(|o| o.category_id).collect();
    assert_eq!(repriced, vec![1, 3]);
    assert_eq!(report.failed_categories, vec![2]);
    assert_eq!(h.store.current_price(3), Some(300.0));
}

#[tokio::test]
async fn test_storage_outage_fails_the_cycle() {
    let h = harness(
        InMemoryPricingStore::new().with_category(1, 100.0, 2),
        "2025-06-01T12:00:00+00:00",
    );
    h.store.set_offline(true);

    assert!(h.engine.run_cycle().await.is_err());
    assert_eq!(h.store.writes(), 0);
}

#[tokio::test]
async fn test_search_burst_triggers_immediate_update() {
    let h = harness(
        InMemoryPricingStore::new()
            .with_category(1, 100.0, 4)
            .with_category(2, 200.0, 4),
        "2025-06-01T12:00:00+00:00",
    );
    seed(&h.cache, "price_suggestion:1:2025-06-20", 100.0).await;
    seed(&h.cache, "price_suggestion:2:2025-06-20", 200.0).await;
    let signal = SearchSignal {
        category_id: Some(1),
        requester_id: Some("guest-7".into()),
        result_categories: vec![1, 1],
        search_date: Some(day("2025-06-20")),
    };

    let first = h.engine.record_search(&signal).await;
    assert!(!first.triggered);
    assert_eq!(first.recent_requests, 1);

    let second = h.engine.record_search(&signal).await;
    assert!(second.triggered);
    assert_eq!(second.recent_requests, 2);
    assert_eq!(second.repriced_categories, vec![1]);

    // 2 searches over 4 free units is the base tier
    assert_eq!(h.store.current_price(1), Some(100.0));
    assert_eq!(h.store.current_price(2), None);
    for key in ["price_suggestion:1:2025-06-20", "price_suggestion:2:2025-06-20"] {
        assert!(!h.cache.exists(key).await.unwrap());
    }

    let stats = h.engine.stats();
    assert_eq!(stats.global_recent_requests, 0);
    assert_eq!(stats.distinct_requesters, 0);
    assert!(stats.per_category.is_empty());
    assert!(stats.last_global_update.is_some());
    assert!(stats.last_category_updates.contains_key(&1));
}

#[tokio::test]
async fn test_search_burst_on_unknown_category_is_not_repriced() {
    let h = harness(
        InMemoryPricingStore::new().with_category(1, 100.0, 4),
        "2025-06-01T12:00:00+00:00",
    );
    let signal = SearchSignal {
        result_categories: vec![999, 999],
        ..Default::default()
    };

    h.engine.record_search(&signal).await;
    let outcome = h.engine.record_search(&signal).await;

    assert!(outcome.triggered);
    assert!(outcome.repriced_categories.is_empty());
    assert_eq!(h.store.writes(), 0);
    assert_eq!(h.store.current_price(1), None);

    let stats = h.engine.stats();
    assert!(stats.last_category_updates.is_empty());
    assert!(stats.last_global_update.is_some());
}

#[tokio::test]
async fn test_stats_reports_live_windows() {
    let h = harness(
        InMemoryPricingStore::new().with_category(4, 90.0, 3),
        "2025-06-01T12:00:00+00:00",
    );
    h.engine
        .tracker()
        .record_search(&SearchSignal {
            requester_id: Some("a".into()),
            result_categories: vec![4, 4, 4],
            ..Default::default()
        });

    let stats = h.engine.stats();

    assert_eq!(stats.pricing_window_seconds, 60);
    assert_eq!(stats.pricing_trigger_threshold, 2);
    assert_eq!(stats.global_recent_requests, 1);
    assert_eq!(stats.distinct_requesters, 1);
    assert_eq!(stats.returned_rooms, 3);
    assert_eq!(stats.per_category.len(), 1);
    assert_eq!(stats.per_category[0].recent_requests, 3);
    assert_eq!(stats.per_category[0].last_updated, None);
}

#[tokio::test]
async fn test_precompute_caches_every_day_and_category() {
    let store = Arc::new(
        InMemoryPricingStore::new()
            .with_category(1, 100.0, 2)
            .with_category(2, 250.0, 2)
            .with_category(3, 300.0, 2),
    );
    store.fail_category(3);
    let memory = Arc::new(MemoryCache::<PriceSuggestion>::default());
    let cache: SuggestionCache = memory.clone();
    let clock = Arc::new(ManualClock::at("2024-12-24T12:00:00+00:00").unwrap());
    let holidays = StaticHolidays::parse("2024-12-25").unwrap();
    let forecast = ForecastEngine::new(store.clone(), Arc::new(holidays));
    let job = PrecomputeJob::new(
        forecast,
        cache,
        clock,
        Duration::from_secs(24 * 60 * 60),
    );

    let report = job.precompute_next_days(3).await.unwrap();

    assert_eq!(report.days, 3);
    assert_eq!(report.categories, 3);
    assert_eq!(report.cached, 6);
    assert_eq!(report.failed, 3);

    let christmas = memory
        .try_get("price_suggestion:2:2024-12-25")
        .await
        .unwrap()
        .unwrap();
    assert!(christmas.holiday);
    assert_eq!(christmas.multiplier, 1.1);
    assert_eq!(christmas.suggested_price, 275.0);
    assert!(memory.exists("price_suggestion:1:2024-12-26").await.unwrap());
    assert!(!memory.exists("price_suggestion:1:2024-12-27").await.unwrap());
}
