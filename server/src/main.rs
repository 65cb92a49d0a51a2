use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router, extract::State, http::StatusCode, response::IntoResponse,
    routing::get,
};
use pricing_dao::PricingDao;
use pricing_demand::SystemClock;
use pricing_engine::PricingConfig;
use pricing_forecast::SuggestionCache;
use pricing_http::{PricingHandlers, PricingServices};
use pricing_models::PriceSuggestion;
use redis_connection::{
    CacheBackend,
    config::{CacheBackendKind, MemoryConfig, RedisDbConfig},
    connect_redis_db,
};
use sql_connection::{SqlConnect, config::PostgresDbConfig, connect_postgres_db};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing connection pools...");

    let db = connect_postgres_db(&PostgresDbConfig::from_env()).await?;
    info!("PostgreSQL connection pool initialized");

    let cache = suggestion_cache().await;

    let config = PricingConfig::from_env();
    let holidays = Arc::new(config.holiday_calendar()?);
    info!(
        window_seconds = config.window_seconds,
        trigger_threshold = config.trigger_threshold,
        interval_seconds = config.interval_seconds,
        holidays = holidays.len(),
        "Pricing configuration loaded"
    );

    let services = PricingServices::new(
        Arc::new(PricingDao::new(db.clone())),
        cache,
        Arc::new(SystemClock),
        holidays,
        config,
    );

    info!("Starting background job scheduler...");
    services.background_jobs.start().await;
    info!("Background job scheduler started successfully");

    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(db)
        .nest("/api", PricingHandlers::routes().with_state(services))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/docs"))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8880);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Pricing server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the suggestion cache selected by `CACHE_BACKEND`. A redis backend
/// that cannot be configured degrades to the in-process cache.
async fn suggestion_cache() -> SuggestionCache {
    let kind = match std::env::var("CACHE_BACKEND") {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{e}, using redis");
            CacheBackendKind::Redis
        }),
        Err(_) => CacheBackendKind::default(),
    };

    let memory = MemoryConfig {
        capacity: std::env::var("CACHE_MEMORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MemoryConfig::default().capacity),
    };

    let pool = if kind == CacheBackendKind::Redis {
        let redis_config = RedisDbConfig {
            host: std::env::var("REDIS_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("REDIS_PORT")
                .unwrap_or_else(|_| "6379".to_string())
                .parse()
                .unwrap_or(6379),
            db: 0,
        };
        match connect_redis_db(&redis_config).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                warn!(
                    "Failed to configure redis: {}. Falling back to the \
                     in-memory cache.",
                    e
                );
                None
            }
        }
    }
    else {
        None
    };

    let backend = CacheBackend::<PriceSuggestion>::from_kind(kind, pool, memory);
    info!(backend = ?backend.kind(), "Suggestion cache initialized");
    Arc::new(backend)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        pricing_http::get_price_forecast,
        pricing_http::record_search,
        pricing_http::get_pricing_stats,
        pricing_http::run_recompute,
        pricing_http::run_precompute
    ),
    components(
        schemas(
            pricing_models::PriceSuggestion,
            pricing_models::SearchSignal,
            pricing_models::TriggerOutcome,
            pricing_models::PricingStats,
            pricing_models::CategoryStats,
            pricing_models::CycleReport,
            pricing_models::CategoryOutcome,
            pricing_models::PriceAction,
            pricing_models::PrecomputeReport,
            common_errors::ApiErrorResponse,
            common_errors::ApiErrorInfo,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "pricing", description = "Price forecasts and demand signals"),
        (name = "admin", description = "Pricing diagnostics and manual refresh")
    ),
    info(
        title = "Room Pricing API",
        description = "Demand-driven dynamic pricing for room categories",
        version = "1.0.0"
    )
)]
struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check successful with connection pool status", body = String)
    ),
    tag = "health"
)]
async fn health_check(State(db): State<SqlConnect>) -> impl IntoResponse {
    let (available, size) = db.get_pool_status();

    (StatusCode::OK, format!("OK - Pool: {available}/{size} available"))
}
