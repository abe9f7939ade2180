//! Root-level liveness probe for load balancers and uptime checks.

use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "safewalk-api";

#[derive(Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    /// `ok`, or `degraded` while Postgres is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of the `SELECT 1` ping. Absent when the ping failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_latency_ms: Option<u64>,
}

/// GET /health. Unauthenticated and always 200; callers read `status`.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let db_latency_ms = match safewalk_db::health_check(&state.pool).await {
        Ok(()) => Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            None
        }
    };
    let db_healthy = db_latency_ms.is_some();

    Json(HealthResponse {
        service: SERVICE_NAME,
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
