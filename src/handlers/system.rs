// ---------------------------------------------------------------------------
// handlers/system.rs - Health, readiness, auth mode
// ---------------------------------------------------------------------------

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: if state.is_ready() { "ok" } else { "starting" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        app: "agent-integrations".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        storage: if state.config.database_url.is_some() { "postgres" } else { "memory" }.to_string(),
        auth_required: state.auth_secret.is_some(),
    })
}

/// GET /api/health/ready - readiness probe, no locks or DB.
pub async fn readiness(State(state): State<AppState>) -> axum::response::Response {
    let ready = state.is_ready();
    let uptime = state.start_time.elapsed().as_secs();
    let body = json!({ "ready": ready, "uptime_seconds": uptime });

    if ready {
        (StatusCode::OK, Json(body)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

/// GET /api/auth/mode - whether protected routes need a token.
pub async fn auth_mode(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "auth_required": state.auth_secret.is_some() }))
}
