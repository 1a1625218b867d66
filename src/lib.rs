pub mod auth;
pub mod config;
pub mod flags;
pub mod handlers;
pub mod http_client;
pub mod i18n;
pub mod mcp;
pub mod models;
pub mod state;

use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;

use state::AppState;

/// Build the application router with the given state.
/// Kept out of `main()` so integration tests can drive the app without
/// binding a port.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/health/ready", get(handlers::readiness))
        .route("/api/auth/mode", get(handlers::auth_mode));

    let protected = Router::new()
        // Per-agent MCP configuration
        .route(
            "/api/agents/{agent_id}/mcp",
            get(handlers::list_configurations).put(handlers::replace_configurations),
        )
        .route("/api/agents/{agent_id}/mcp/custom", post(handlers::add_custom))
        .route("/api/agents/{agent_id}/mcp/registry", post(handlers::add_from_registry))
        .route("/api/agents/{agent_id}/mcp/browser", post(handlers::add_from_browser))
        .route("/api/agents/{agent_id}/mcp/tools", patch(handlers::update_tools))
        .route("/api/agents/{agent_id}/mcp/credentials", put(handlers::save_credentials))
        .route("/api/agents/{agent_id}/mcp/credentials/form", post(handlers::credential_form))
        .route(
            "/api/agents/{agent_id}/mcp/{index}",
            get(handlers::begin_edit)
                .put(handlers::save_edit)
                .delete(handlers::remove_configuration),
        )
        .route("/api/agents/{agent_id}/mcp/{index}/tools-target", get(handlers::tools_target))
        // Server browser
        .route("/api/mcp/servers", get(handlers::browse_servers))
        // i18n
        .route(
            "/api/i18n/language",
            get(handlers::current_language).put(handlers::change_language),
        )
        .route("/api/i18n/translate", get(handlers::translate))
        // Feature flags
        .route("/api/feature-flags", get(handlers::list_flags))
        .route(
            "/api/feature-flags/{name}",
            get(handlers::get_flag)
                .put(handlers::set_flag)
                .delete(handlers::delete_flag),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    public.merge(protected).with_state(state)
}
