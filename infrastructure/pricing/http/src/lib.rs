pub mod background_jobs;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
    routing::{get, post},
};
use chrono::NaiveDate;
use common_errors::AppError;
use pricing_dao::PricingStore;
use pricing_demand::Clock;
use pricing_engine::{PrecomputeJob, PricingConfig, PricingEngine};
use pricing_errors::PricingError;
use pricing_forecast::{
    ForecastEngine, ForecastQueryHandler, PriceForecastQuery, SuggestionCache,
};
use pricing_models::{
    CycleReport, PrecomputeReport, PriceSuggestion, PricingStats,
    SearchSignal, TriggerOutcome,
};
use pricing_rules::HolidayCalendar;
use serde::Deserialize;
use tracing::{instrument, warn};
use utoipa::IntoParams;

use crate::background_jobs::BackgroundJobScheduler;

/// Upper bound for an on-demand precompute horizon.
pub const MAX_PRECOMPUTE_DAYS: u32 = 366;

#[derive(Clone)]
pub struct PricingServices {
    pub forecast: ForecastQueryHandler,
    pub engine: Arc<PricingEngine>,
    pub precompute: PrecomputeJob,
    pub background_jobs: BackgroundJobScheduler,
}

impl PricingServices {
    pub fn new(
        store: Arc<dyn PricingStore>, cache: SuggestionCache,
        clock: Arc<dyn Clock>, holidays: Arc<dyn HolidayCalendar>,
        config: PricingConfig,
    ) -> Self {
        let forecast_engine = ForecastEngine::new(store.clone(), holidays);
        let forecast = ForecastQueryHandler::new(
            forecast_engine.clone(),
            cache.clone(),
            config.ttls(),
        );
        let precompute = PrecomputeJob::new(
            forecast_engine,
            cache.clone(),
            clock.clone(),
            config.ttls().daily,
        );
        let engine = Arc::new(PricingEngine::new(
            store,
            cache,
            clock.clone(),
            config,
        ));
        let background_jobs = BackgroundJobScheduler::new(
            engine.clone(),
            precompute.clone(),
            clock,
        );

        Self {
            forecast,
            engine,
            precompute,
            background_jobs,
        }
    }
}

pub struct PricingHandlers;

impl PricingHandlers {
    pub fn routes() -> Router<PricingServices> {
        Router::new()
            .route("/forecast/price", get(get_price_forecast))
            .route("/demand/search", post(record_search))
            .route("/admin/pricing-stats", get(get_pricing_stats))
            .route("/admin/pricing/recompute", post(run_recompute))
            .route("/admin/pricing/precompute", post(run_precompute))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastParams {
    /// Room category
    #[serde(rename = "roomTypeID")]
    pub room_type_id: i64,
    /// First night, `YYYY-MM-DD`
    pub from: NaiveDate,
    /// Exclusive end; defaults to the day after `from`
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrecomputeParams {
    /// Horizon in days; defaults to the configured daily horizon
    pub days: Option<u32>,
}

/// Query string errors answer with the JSON error body like every other 400.
fn query_error(rejection: QueryRejection) -> AppError {
    match rejection {
        QueryRejection::FailedToDeserializeQueryString(err) => {
            AppError::bad_request(
                "INVALID_QUERY_PARAMS",
                "Invalid query parameters provided",
            )
            .with_details(format!(
                "Query parameter error: {err}. Expected dates as YYYY-MM-DD"
            ))
        }
        _ => AppError::bad_request(
            "INVALID_QUERY_PARAMS",
            "Invalid query parameters provided",
        ),
    }
}

#[utoipa::path(
    get,
    path = "/api/forecast/price",
    params(ForecastParams),
    responses(
        (status = 200, description = "Suggested price", body = PriceSuggestion),
        (status = 400, description = "Invalid query, category or date range", body = common_errors::ApiErrorResponse),
        (status = 503, description = "Pricing data unavailable", body = common_errors::ApiErrorResponse)
    ),
    tag = "pricing"
)]
#[instrument(skip_all)]
pub async fn get_price_forecast(
    State(services): State<PricingServices>,
    query_result: Result<Query<ForecastParams>, QueryRejection>,
) -> Result<Json<PriceSuggestion>, AppError> {
    let Query(params) = query_result.map_err(query_error)?;
    let query = PriceForecastQuery {
        category_id: params.room_type_id,
        from: params.from,
        to: params.to,
    };
    let suggestion = services.forecast.execute(query).await.inspect_err(|e| {
        if !e.is_invalid_input() {
            warn!(category_id = query.category_id, error = %e, "forecast failed");
        }
    })?;
    Ok(Json(suggestion))
}

#[utoipa::path(
    post,
    path = "/api/demand/search",
    request_body = SearchSignal,
    responses(
        (status = 200, description = "Signal recorded", body = TriggerOutcome)
    ),
    tag = "pricing"
)]
#[instrument(skip_all)]
pub async fn record_search(
    State(services): State<PricingServices>, Json(signal): Json<SearchSignal>,
) -> Json<TriggerOutcome> {
    Json(services.engine.record_search(&signal).await)
}

#[utoipa::path(
    get,
    path = "/api/admin/pricing-stats",
    responses(
        (status = 200, description = "Demand and pricing diagnostics", body = PricingStats)
    ),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn get_pricing_stats(
    State(services): State<PricingServices>,
) -> Json<PricingStats> {
    Json(services.engine.stats())
}

#[utoipa::path(
    post,
    path = "/api/admin/pricing/recompute",
    responses(
        (status = 200, description = "Cycle report", body = CycleReport),
        (status = 503, description = "Pricing data unavailable", body = common_errors::ApiErrorResponse)
    ),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn run_recompute(
    State(services): State<PricingServices>,
) -> Result<Json<CycleReport>, AppError> {
    let report = services
        .background_jobs
        .trigger_recompute()
        .await
        .map_err(PricingError::from)?;
    Ok(Json(report))
}

#[utoipa::path(
    post,
    path = "/api/admin/pricing/precompute",
    params(PrecomputeParams),
    responses(
        (status = 200, description = "Precompute report", body = PrecomputeReport),
        (status = 400, description = "Invalid query or horizon out of range", body = common_errors::ApiErrorResponse),
        (status = 503, description = "Pricing data unavailable", body = common_errors::ApiErrorResponse)
    ),
    tag = "admin"
)]
#[instrument(skip_all)]
pub async fn run_precompute(
    State(services): State<PricingServices>,
    query_result: Result<Query<PrecomputeParams>, QueryRejection>,
) -> Result<Json<PrecomputeReport>, AppError> {
    let Query(params) = query_result.map_err(query_error)?;
    let days = params
        .days
        .unwrap_or(services.engine.config().precompute_days);
    if days == 0 || days > MAX_PRECOMPUTE_DAYS {
        return Err(AppError::bad_request(
            "INVALID_HORIZON",
            &format!("days must be between 1 and {MAX_PRECOMPUTE_DAYS}"),
        ));
    }

    let report = services
        .background_jobs
        .trigger_precompute(days)
        .await
        .map_err(PricingError::from)?;
    Ok(Json(report))
}
