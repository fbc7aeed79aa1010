use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;

use crate::http::server::AppState;
use crate::monitor::Statistic;
use crate::tsdb::{EngineError, Point};

/// Header carrying the daemon version on every `/ping` response.
pub const VERSION_HEADER: HeaderName = HeaderName::from_static("x-tsdb-version");

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
}

#[derive(Serialize)]
pub struct DebugVars {
    pub statistics: Vec<Statistic>,
}

pub async fn ping(State(state): State<AppState>) -> impl IntoResponse {
    state.stats.ping_requests.fetch_add(1, Ordering::Relaxed);
    let version = HeaderValue::from_str(state.build.version)
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    (StatusCode::NO_CONTENT, [(VERSION_HEADER, version)])
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    state.stats.health_requests.fetch_add(1, Ordering::Relaxed);
    Json(HealthStatus {
        status: "pass",
        version: state.build.version,
        commit: state.build.commit,
    })
}

pub async fn debug_vars(State(state): State<AppState>) -> Json<DebugVars> {
    state.stats.vars_requests.fetch_add(1, Ordering::Relaxed);
    Json(DebugVars {
        statistics: state.monitor.collect(),
    })
}

#[derive(Debug, Deserialize)]
pub struct QueryParams {
    pub series: String,
}

#[derive(Debug, Serialize)]
pub struct SeriesResult {
    pub series: String,
    pub points: Vec<Point>,
}

/// Engine error rendered as a JSON error response.
#[derive(Debug)]
pub struct EngineFailure(pub EngineError);

impl IntoResponse for EngineFailure {
    fn into_response(self) -> Response {
        let status = match self.0 {
            EngineError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub async fn write(
    State(state): State<AppState>,
    Json(points): Json<Vec<Point>>,
) -> Result<StatusCode, EngineFailure> {
    state.stats.write_requests.fetch_add(1, Ordering::Relaxed);
    state.store.engine().write_points(&points).map_err(|e| {
        tracing::warn!(error = %e, points = points.len(), "Write failed");
        EngineFailure(e)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<SeriesResult>, EngineFailure> {
    state.stats.query_requests.fetch_add(1, Ordering::Relaxed);
    let points = state.store.engine().read_series(&params.series).map_err(EngineFailure)?;
    Ok(Json(SeriesResult {
        series: params.series,
        points,
    }))
}
