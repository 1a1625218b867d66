// ---------------------------------------------------------------------------
// handlers/flags.rs - Feature flag lookup and administration
// ---------------------------------------------------------------------------

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::flags::FlagStatus;
use crate::models::FlagUpdate;
use crate::state::AppState;

use super::ApiError;

/// Stored flags with forced values applied on top.
pub async fn list_flags(State(state): State<AppState>) -> Json<Value> {
    let overrides = state.flags.overrides();
    let mut flags = state.flags.store().list().await;
    for (name, value) in overrides.entries() {
        flags.insert(name, value);
    }
    Json(json!({
        "flags": flags,
        "forced": overrides.entries().into_keys().collect::<Vec<_>>(),
    }))
}

pub async fn get_flag(State(state): State<AppState>, Path(name): Path<String>) -> Json<FlagStatus> {
    Json(state.flags.status(&name).await)
}

pub async fn set_flag(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<FlagUpdate>,
) -> Result<Json<FlagStatus>, ApiError> {
    state
        .flags
        .store()
        .set_flag(&name, body.enabled, body.description.as_deref())
        .await?;
    Ok(Json(state.flags.status(&name).await))
}

pub async fn delete_flag(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.flags.store().delete(&name).await? {
        return Err(ApiError::NotFound(format!("feature flag '{name}' does not exist")));
    }
    Ok(Json(json!({ "deleted": name })))
}
