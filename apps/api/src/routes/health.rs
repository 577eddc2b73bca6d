//! Health check for monitoring and load balancers.
//!
//! The database is required; the cache is best-effort, so an unreachable
//! cache reports `degraded` but still answers 200.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingStatus {
    Serving,
    Degraded,
    NotServing,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: ServingStatus,
    pub database: bool,
    pub cache: bool,
    /// `redis` or `memory`
    pub cache_backend: String,
    pub server_time: String,
}

async fn health(State(state): State<AppState>) -> (StatusCode, ApiJson<HealthResponse>) {
    let database = state.db.health_check().await;
    let cache = state.cache.is_healthy().await;

    let status = match (database, cache) {
        (false, _) => ServingStatus::NotServing,
        (true, false) => ServingStatus::Degraded,
        (true, true) => ServingStatus::Serving,
    };

    if status != ServingStatus::Serving {
        warn!(database, cache, "Health check failing");
    }

    let code = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        ApiJson(HealthResponse {
            status,
            database,
            cache,
            cache_backend: state.cache.store().name().to_string(),
            server_time: Utc::now().to_rfc3339(),
        }),
    )
}
