//! Health check endpoints

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub oracle: CheckResult,
    pub sessions: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn info(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: Some(message.into()),
        }
    }

    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: "unavailable",
            message: Some(message.into()),
        }
    }
}

/// System status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub oracle: &'static str,
    pub model: String,
    pub active_sessions: usize,
    pub max_queue_length: usize,
    pub session_ttl_secs: u64,
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - can requests get real advice?
///
/// A missing oracle credential means every turn would fall back, so the
/// service reports itself degraded.
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let oracle_check = check_oracle(&state);
    let sessions_check = CheckResult::info(format!(
        "{} active",
        state.advisor.store().len()
    ));

    let all_ok = oracle_check.status == "ok";
    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                oracle: oracle_check,
                sessions: sessions_check,
            },
        }),
    )
}

/// Check oracle configuration
fn check_oracle(state: &ApiState) -> CheckResult {
    if state.advisor.oracle().is_configured() {
        CheckResult::ok()
    } else {
        CheckResult::unavailable("API key not configured")
    }
}

/// Report model and store settings
async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    let store = state.advisor.store();

    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        oracle: state.advisor.oracle().name(),
        model: state.model.clone(),
        active_sessions: store.len(),
        max_queue_length: store.max_queue_length(),
        session_ttl_secs: store.ttl().as_secs(),
    })
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/api/status", get(status))
        .with_state(state)
}
