use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::Router,
};
use pricing_dao::{PricingDao, PricingStore};
use pricing_demand::ManualClock;
use pricing_engine::PricingConfig;
use pricing_http::{PricingHandlers, PricingServices};
use pricing_models::{CategoryId, PriceSuggestion};
use pricing_rules::StaticHolidays;
use redis_connection::{CacheTrait, RedisCache};
use serde_json::{Value, json};
use test_utils::{
    TestPostgresContainer, TestRedisContainer, day,
    fixtures::{create_booking, create_category, current_price},
    seed::{SEED_CATEGORIES, seed_inventory},
};
use tower::ServiceExt;

pub struct IntegrationTestSetup {
    pub container: TestPostgresContainer,
    pub redis_container: TestRedisContainer,
    pub cache: Arc<RedisCache<PriceSuggestion>>,
    pub app: Router,
}

impl IntegrationTestSetup {
    pub async fn new() -> anyhow::Result<Self> {
        let container = TestPostgresContainer::new().await?;
        let redis_container = TestRedisContainer::new().await?;

        let cache = Arc::new(RedisCache::new(redis_container.pool.clone()));
        let clock = Arc::new(ManualClock::at("2025-06-01T12:00:00+00:00")?);
        let services = PricingServices::new(
            Arc::new(PricingDao::new(container.sql_connect())),
            cache.clone(),
            clock,
            Arc::new(StaticHolidays::parse("2025-12-25")?),
            PricingConfig::default(),
        );
        let app = Router::new()
            .nest("/api", PricingHandlers::routes().with_state(services));

        Ok(Self {
            container,
            redis_container,
            cache,
            app,
        })
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn search(&self, category_id: CategoryId) -> Value {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/demand/search")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "room_type_id": category_id, "requester_id": "guest" })
                    .to_string(),
            ))
            .unwrap();
        self.send(request).await.1
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_forecast_reads_bookings_and_caches_in_redis() {
    let setup = IntegrationTestSetup::new().await.unwrap();
    let (category, rooms) =
        create_category(&setup.container, "Deluxe", 200.0, 10)
            .await
            .unwrap();
    for room in rooms.iter().take(8) {
        create_booking(
            &setup.container,
            *room,
            day("2025-07-01"),
            day("2025-07-02"),
            "Confirmed",
        )
        .await
        .unwrap();
    }
    create_booking(
        &setup.container,
        rooms[9],
        day("2025-07-01"),
        day("2025-07-02"),
        "Cancelled",
    )
    .await
    .unwrap();

    let (status, json) = setup
        .send(get(&format!(
            "/api/forecast/price?roomTypeID={category}&from=2025-07-01"
        )))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["occupancy_rate"], 0.8);
    assert_eq!(json["multiplier"], 1.25);
    assert_eq!(json["suggested_price"], 250.0);

    let key = format!("price_suggestion:{category}:2025-07-01");
    let cached = setup.cache.try_get(&key).await.unwrap().unwrap();
    assert_eq!(cached.suggested_price, 250.0);
    let ttl = setup.redis_container.ttl(&key).await.unwrap();
    assert!(ttl > 0 && ttl <= 86_400);
}

#[tokio::test]
async fn test_search_burst_persists_price_and_invalidates_cache() {
    let setup = IntegrationTestSetup::new().await.unwrap();
    let (category, _) = create_category(&setup.container, "Suite", 100.0, 1)
        .await
        .unwrap();

    let (status, _) = setup
        .send(get(&format!(
            "/api/forecast/price?roomTypeID={category}&from=2025-06-01"
        )))
        .await;
    assert_eq!(status, StatusCode::OK);
    let key = format!("price_suggestion:{category}:2025-06-01");
    assert!(setup.cache.exists(&key).await.unwrap());

    let first = setup.search(category).await;
    assert_eq!(first["triggered"], false);
    let second = setup.search(category).await;
    assert_eq!(second["triggered"], true);
    assert_eq!(second["repriced_categories"], json!([category]));

    // 2 requests for 1 free unit
    assert_eq!(
        current_price(&setup.container, category).await.unwrap(),
        Some(125.0)
    );
    assert!(!setup.cache.exists(&key).await.unwrap());

    let (status, report) = setup.send(post("/api/admin/pricing/recompute")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["outcomes"][0]["action"], "reset");
    assert_eq!(
        current_price(&setup.container, category).await.unwrap(),
        Some(100.0)
    );
}

#[tokio::test]
async fn test_precompute_fills_redis_for_every_category() {
    let setup = IntegrationTestSetup::new().await.unwrap();
    let (standard, _) =
        create_category(&setup.container, "Standard", 120.0, 4)
            .await
            .unwrap();
    let (suite, _) = create_category(&setup.container, "Suite", 450.0, 2)
        .await
        .unwrap();

    let (status, report) =
        setup.send(post("/api/admin/pricing/precompute?days=3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["cached"], 6);
    assert_eq!(report["failed"], 0);
    for category in [standard, suite] {
        for date in ["2025-06-01", "2025-06-02", "2025-06-03"] {
            let key = format!("price_suggestion:{category}:{date}");
            assert!(setup.cache.exists(&key).await.unwrap(), "{key}");
        }
    }
}

#[tokio::test]
async fn test_seed_inventory_creates_rooms_once() {
    let container = TestPostgresContainer::new().await.unwrap();
    let db = container.sql_connect();
    let dao = PricingDao::new(db.clone());

    let ids = seed_inventory(&db).await.unwrap();
    assert_eq!(ids.len(), SEED_CATEGORIES.len());
    for (id, (_, _, rooms)) in ids.iter().zip(SEED_CATEGORIES) {
        assert_eq!(dao.unit_count(*id).await.unwrap(), *rooms);
    }

    let again = seed_inventory(&db).await.unwrap();
    assert_eq!(again, ids);
    assert_eq!(dao.list_categories().await.unwrap().len(), ids.len());
    for (id, (_, _, rooms)) in ids.iter().zip(SEED_CATEGORIES) {
        assert_eq!(dao.unit_count(*id).await.unwrap(), *rooms);
    }
}
