// ---------------------------------------------------------------------------
// handlers/mcp.rs - Per-agent MCP configuration list and server browser
// ---------------------------------------------------------------------------

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

use crate::mcp::credentials::{CredentialForm, CredentialUpdate};
use crate::mcp::editor::{CustomDraft, RegistrySelection};
use crate::mcp::model::McpConfiguration;
use crate::mcp::profiles::CredentialProfile;
use crate::mcp::registry::{RegistryServer, ServerPage};
use crate::models::{BrowseQuery, BrowseTab, ConfigurationList, CredentialFormRequest, ToolsUpdateRequest};
use crate::state::AppState;

use super::ApiError;

fn listed(configurations: Vec<McpConfiguration>) -> Json<ConfigurationList> {
    Json(ConfigurationList { configurations })
}

/// Profiles for the credential form. A failing profile source degrades to
/// manual entry.
async fn profiles_for(state: &AppState, qualified_name: &str) -> Vec<CredentialProfile> {
    match state.profiles.profiles_for(qualified_name).await {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::warn!(qualified_name, error = %e, "credential profiles unavailable");
            Vec::new()
        }
    }
}

// ── List ────────────────────────────────────────────────────────────────────

pub async fn list_configurations(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.list(&agent_id).await?))
}

pub async fn replace_configurations(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<ConfigurationList>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.replace_all(&agent_id, body.configurations).await?))
}

// ── Add ─────────────────────────────────────────────────────────────────────

pub async fn add_custom(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(draft): Json<CustomDraft>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.add_custom(&agent_id, draft).await?))
}

pub async fn add_from_registry(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(selection): Json<RegistrySelection>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.add_from_registry(&agent_id, selection).await?))
}

/// Adds the server and returns the credential form the client should show next.
pub async fn add_from_browser(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(server): Json<RegistryServer>,
) -> Result<Json<Value>, ApiError> {
    let (configurations, entry) = state.mcp.add_from_browser(&agent_id, &server).await?;
    let profiles = profiles_for(&state, &entry.qualified_name).await;
    let form = CredentialForm::open(entry, profiles);
    Ok(Json(json!({
        "configurations": configurations,
        "credentials": form.view(false),
    })))
}

// ── Edit / remove ───────────────────────────────────────────────────────────

pub async fn update_tools(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<ToolsUpdateRequest>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.update_tools(&agent_id, &body.key, body.enabled_tools).await?))
}

pub async fn remove_configuration(
    State(state): State<AppState>,
    Path((agent_id, index)): Path<(String, usize)>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.remove(&agent_id, index).await?))
}

pub async fn begin_edit(
    State(state): State<AppState>,
    Path((agent_id, index)): Path<(String, usize)>,
) -> Result<Json<CustomDraft>, ApiError> {
    Ok(Json(state.mcp.begin_edit(&agent_id, index).await?))
}

pub async fn save_edit(
    State(state): State<AppState>,
    Path((agent_id, index)): Path<(String, usize)>,
    Json(draft): Json<CustomDraft>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.save_edit(&agent_id, index, draft).await?))
}

pub async fn tools_target(
    State(state): State<AppState>,
    Path((agent_id, index)): Path<(String, usize)>,
) -> Result<Json<Value>, ApiError> {
    let target = state.mcp.tools_target(&agent_id, index).await?;
    Ok(Json(json!({ "target": target })))
}

// ── Credentials ─────────────────────────────────────────────────────────────

pub async fn credential_form(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<CredentialFormRequest>,
) -> Result<Json<Value>, ApiError> {
    let entry = state.mcp.find(&agent_id, &body.qualified_name).await?;
    let profiles = profiles_for(&state, &entry.qualified_name).await;
    let form = CredentialForm::open(entry, profiles);
    Ok(Json(json!(form.view(body.reveal))))
}

pub async fn save_credentials(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(update): Json<CredentialUpdate>,
) -> Result<Json<ConfigurationList>, ApiError> {
    Ok(listed(state.mcp.save_credentials(&agent_id, update).await?))
}

// ── Server browser ──────────────────────────────────────────────────────────

pub async fn browse_servers(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ServerPage>, ApiError> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let page = match (query.tab, search) {
        (_, Some(q)) => state.registry.search(q, query.page, query.page_size).await?,
        (BrowseTab::All, None) => state.registry.search("", query.page, query.page_size).await?,
        (BrowseTab::Popular, None) => state.registry.popular(query.page, query.page_size).await?,
    };
    Ok(Json(page))
}
