// ---------------------------------------------------------------------------
// handlers/i18n.rs - Language preference and string lookup
// ---------------------------------------------------------------------------

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde_json::{json, Value};

use crate::models::{LanguageUpdate, TranslateQuery};
use crate::state::AppState;

use super::ApiError;

fn accept_language(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok())
}

pub async fn current_language(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let language = state.translator.language(accept_language(&headers)).await;
    Json(json!({ "language": language }))
}

pub async fn change_language(
    State(state): State<AppState>,
    Json(body): Json<LanguageUpdate>,
) -> Result<Json<Value>, ApiError> {
    state.translator.change_language(body.language).await?;
    Ok(Json(json!({ "language": body.language })))
}

pub async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TranslateQuery>,
) -> Json<Value> {
    let language = match query.lang {
        Some(lang) => lang,
        None => state.translator.language(accept_language(&headers)).await,
    };
    let value = state.translator.t(&query.key, language);
    Json(json!({ "key": query.key, "language": language, "value": value }))
}
