// ---------------------------------------------------------------------------
// handlers/ - HTTP surface, one sub-module per area
// ---------------------------------------------------------------------------

pub(crate) mod flags;
pub(crate) mod i18n;
pub(crate) mod mcp;
pub(crate) mod system;

pub use flags::{delete_flag, get_flag, list_flags, set_flag};
pub use i18n::{change_language, current_language, translate};
pub use mcp::{
    add_custom, add_from_browser, add_from_registry, begin_edit, browse_servers, credential_form,
    list_configurations, remove_configuration, replace_configurations, save_credentials, save_edit,
    tools_target, update_tools,
};
pub use system::{auth_mode, health, readiness};

// ── Error type ──────────────────────────────────────────────────────────────

use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::flags::FlagStoreError;
use crate::http_client::FetchError;
use crate::i18n::preferences::PreferenceError;
use crate::mcp::McpError;

/// Handler error. Logs full details server-side and returns
/// `{"error": {"code", "message", "request_id"}}` to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream API error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub(crate) fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show clients. Upstream and internal details stay in the log.
    pub(crate) fn sanitized_message(&self) -> String {
        match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) => m.clone(),
            ApiError::Upstream(_) => "Upstream service error".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(request_id = %request_id, code = self.error_code(), "API error ({}): {}", status.as_u16(), self);
        } else {
            tracing::warn!(request_id = %request_id, code = self.error_code(), "API error ({}): {}", status.as_u16(), self);
        }

        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.sanitized_message(),
                "request_id": request_id,
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<McpError> for ApiError {
    fn from(e: McpError) -> Self {
        match e {
            McpError::Store(e) => ApiError::Internal(e.to_string()),
            McpError::Config(e) => ApiError::BadRequest(e.to_string()),
            e @ McpError::NotEditable(_) => ApiError::BadRequest(e.to_string()),
            e @ (McpError::IndexOutOfRange { .. } | McpError::UnknownEntry(_)) => ApiError::NotFound(e.to_string()),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

impl From<FlagStoreError> for ApiError {
    fn from(e: FlagStoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<PreferenceError> for ApiError {
    fn from(e: PreferenceError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
