//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::gateway::{GatewayError, NearbyOutcome, NearbyQuery, RegionalError};
use crate::operators::{StoreError, aggregate_from_store};

use super::dto::*;
use super::state::AppState;

/// Shared caching allowed for fresh nearby results.
const NEARBY_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

/// Shared caching allowed for regional snapshots.
const REGIONAL_CACHE_CONTROL: &str = "public, s-maxage=3600";

/// Degraded responses must not be cached by intermediaries.
const NO_STORE: &str = "no-store";

const X_CACHE: &str = "x-cache";
const X_RATE_LIMITED: &str = "x-ratelimited";

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/charging-stations/nearby", get(nearby_stations))
        .route("/charging-stations/regional", get(regional_stations))
        .route("/operators", get(operators))
        .route("/cache/stats", get(cache_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stations around a point.
///
/// Upstream failures still answer 200 with `[]`; see `X-Cache: BYPASS`.
async fn nearby_stations(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<Response, AppError> {
    let query = NearbyQuery::parse(
        params.lat.as_deref(),
        params.lng.as_deref(),
        params.distance.as_deref(),
        params.maxresults.as_deref(),
    )?;

    let outcome = state.gateway.get_nearby(&query).await?;

    Ok(nearby_response(&outcome))
}

fn nearby_response(outcome: &NearbyOutcome) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(X_CACHE),
        HeaderValue::from_static(outcome.cache_status().as_str()),
    );

    let cache_control = if outcome.is_degraded() {
        NO_STORE
    } else {
        NEARBY_CACHE_CONTROL
    };
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache_control));

    if let Some(retry_after) = outcome.retry_after() {
        headers.insert(
            HeaderName::from_static(X_RATE_LIMITED),
            HeaderValue::from_static("true"),
        );
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after.as_secs()));
    }

    (StatusCode::OK, headers, Json(outcome.stations())).into_response()
}

/// Minimized country-wide snapshot.
async fn regional_stations(
    State(state): State<AppState>,
    Query(params): Query<RegionalParams>,
) -> Result<Response, AppError> {
    let stations = state
        .regional
        .get_regional(params.bounding_box.as_deref())
        .await?;

    Ok((
        [(header::CACHE_CONTROL, REGIONAL_CACHE_CONTROL)],
        Json(stations.as_slice()),
    )
        .into_response())
}

/// Operator roster built from the station store.
async fn operators(State(state): State<AppState>) -> Result<Json<OperatorsResponse>, AppError> {
    let operators = aggregate_from_store(state.store.as_ref()).await?;

    Ok(Json(OperatorsResponse {
        success: true,
        total: operators.len(),
        operators,
    }))
}

/// Cache counters for monitoring.
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        nearby: state.gateway.cache_stats().await,
        regional: RegionalStats {
            entries: state.regional.entry_count(),
        },
    })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
    /// Operator roster could not be built. Carries `success: false`.
    Aggregation { message: String },
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        if e.is_client_error() {
            AppError::BadRequest {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<RegionalError> for AppError {
    fn from(e: RegionalError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Aggregation {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, success, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, None, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, None, message),
            AppError::Aggregation { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(false), message)
            }
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "rejected request");
        }

        let body = Json(ErrorResponse {
            success,
            error: message,
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
