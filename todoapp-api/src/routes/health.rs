/// Service endpoints
///
/// ```text
/// GET /        -> "API Todo App - Backend fonctionne correctement"
/// GET /health  -> { "status": "healthy", "version": "0.1.0", "database": "connected" }
/// ```

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

pub const BANNER: &str = "API Todo App - Backend fonctionne correctement";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database is unreachable
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

/// Plain-text liveness banner
pub async fn banner() -> &'static str {
    BANNER
}

/// Reports service health including database connectivity
///
/// Always answers 200; a database outage shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.users.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
