//! Pure transformations over an agent's MCP configuration list.
//!
//! Every operation takes the current list and returns the replacement list;
//! the caller persists the result as a whole. Lookups by index or key that
//! miss leave the list unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{
    ConfigError, CustomType, EntryKey, McpConfig, McpConfiguration, PipedreamConfig, RegistryConfig,
    PIPEDREAM_APP_SLUG_HEADER, PIPEDREAM_MCP_URL, SMITHERY_SERVER_BASE,
};
use super::registry::RegistryServer;

// ── Inputs ──────────────────────────────────────────────────────────────────

/// Output of the custom-server dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CustomType,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub enabled_tools: Vec<String>,
    #[serde(default)]
    pub selected_profile_id: Option<String>,
}

/// Output of the Pipedream app picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySelection {
    pub profile_id: String,
    #[serde(alias = "selectedTools")]
    pub enabled_tools: Vec<String>,
    pub app_name: String,
    pub app_slug: String,
}

/// Where the tool-configuration flow should go for an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ToolsTarget {
    Pipedream { profile_id: String, app_name: String },
    Custom { name: String, config: Map<String, Value> },
}

// ── Naming ──────────────────────────────────────────────────────────────────

/// `custom_<type>_<millis>`, bumped until no entry in `list` uses it.
pub fn unique_custom_name(list: &[McpConfiguration], kind: CustomType, now_ms: i64) -> String {
    let mut stamp = now_ms;
    loop {
        let candidate = format!("custom_{kind}_{stamp}");
        if !list.iter().any(|c| c.qualified_name == candidate) {
            return candidate;
        }
        stamp += 1;
    }
}

fn build_custom(draft: CustomDraft, qualified_name: String) -> Result<McpConfiguration, ConfigError> {
    let config = McpConfig::from_map(Some(draft.kind), draft.config)?;
    Ok(McpConfiguration {
        name: draft.name,
        qualified_name,
        config,
        enabled_tools: draft.enabled_tools,
        selected_profile_id: draft.selected_profile_id.filter(|id| !id.is_empty()),
        is_custom: true,
    })
}

// ── Operations ──────────────────────────────────────────────────────────────

pub fn add_custom(
    list: &[McpConfiguration],
    draft: CustomDraft,
    now_ms: i64,
) -> Result<Vec<McpConfiguration>, ConfigError> {
    let qualified_name = unique_custom_name(list, draft.kind, now_ms);
    let entry = build_custom(draft, qualified_name)?;
    let mut next = list.to_vec();
    next.push(entry);
    Ok(next)
}

/// Append a Pipedream entry, replacing any entry bound to the same profile.
pub fn add_from_registry(list: &[McpConfiguration], selection: RegistrySelection) -> Vec<McpConfiguration> {
    let RegistrySelection {
        profile_id,
        enabled_tools,
        app_name,
        app_slug,
    } = selection;

    let entry = McpConfiguration {
        name: app_name,
        qualified_name: format!("pipedream_{app_slug}_{profile_id}"),
        config: McpConfig::Pipedream(PipedreamConfig {
            url: PIPEDREAM_MCP_URL.to_string(),
            headers: BTreeMap::from([(PIPEDREAM_APP_SLUG_HEADER.to_string(), app_slug)]),
            profile_id: Some(profile_id.clone()),
            extra: Map::new(),
        }),
        enabled_tools,
        selected_profile_id: Some(profile_id),
        is_custom: true,
    };

    let key = entry.key();
    let mut next: Vec<McpConfiguration> = list.iter().filter(|c| !c.matches(&key)).cloned().collect();
    let replaced = list.len() - next.len();
    if replaced > 0 {
        tracing::debug!(replaced, qualified_name = %entry.qualified_name, "replacing pipedream entry for profile");
    }
    next.push(entry);
    next
}

pub fn browser_entry(server: &RegistryServer) -> McpConfiguration {
    McpConfiguration {
        name: server.display_name.clone(),
        qualified_name: server.qualified_name.clone(),
        config: McpConfig::Registry(RegistryConfig {
            server_url: format!("{SMITHERY_SERVER_BASE}/{}/mcp", server.qualified_name),
            requires_config: true,
            extra: Map::new(),
        }),
        enabled_tools: Vec::new(),
        selected_profile_id: None,
        is_custom: false,
    }
}

/// Append a server picked in the browser. The returned entry is the one the
/// credential editor should open next.
pub fn add_from_browser(
    list: &[McpConfiguration],
    server: &RegistryServer,
) -> (Vec<McpConfiguration>, McpConfiguration) {
    let entry = browser_entry(server);
    let mut next = list.to_vec();
    next.push(entry.clone());
    (next, entry)
}

pub fn update_tools(list: &[McpConfiguration], key: &EntryKey, tools: Vec<String>) -> Vec<McpConfiguration> {
    if !list.iter().any(|c| c.matches(key)) {
        tracing::warn!(?key, "no MCP configuration matches tool update");
        return list.to_vec();
    }
    list.iter()
        .map(|c| {
            if c.matches(key) {
                McpConfiguration {
                    enabled_tools: tools.clone(),
                    ..c.clone()
                }
            } else {
                c.clone()
            }
        })
        .collect()
}

pub fn remove(list: &[McpConfiguration], index: usize) -> Vec<McpConfiguration> {
    let mut next = list.to_vec();
    if index < next.len() {
        next.remove(index);
    } else {
        tracing::warn!(index, len = list.len(), "remove index out of range");
    }
    next
}

/// Pre-fill the custom dialog from an existing entry. Registry entries are
/// edited through the credential editor instead.
pub fn begin_edit(list: &[McpConfiguration], index: usize) -> Option<CustomDraft> {
    let entry = list.get(index)?;
    let kind = entry.custom_type()?;
    Some(CustomDraft {
        name: entry.name.clone(),
        kind,
        config: entry.config.to_map(),
        enabled_tools: entry.enabled_tools.clone(),
        selected_profile_id: entry.selected_profile_id.clone(),
    })
}

/// Overwrite the entry at `index` with a freshly named custom entry.
pub fn save_edit(
    list: &[McpConfiguration],
    index: usize,
    draft: CustomDraft,
    now_ms: i64,
) -> Result<Vec<McpConfiguration>, ConfigError> {
    if index >= list.len() {
        tracing::warn!(index, len = list.len(), "edit index out of range");
        return Ok(list.to_vec());
    }
    let qualified_name = unique_custom_name(list, draft.kind, now_ms);
    let entry = build_custom(draft, qualified_name)?;
    let mut next = list.to_vec();
    next[index] = entry;
    Ok(next)
}

/// Point a pipedream entry's config and name at its selected profile.
fn rebind_pipedream(mut entry: McpConfiguration) -> McpConfiguration {
    let Some(profile_id) = entry.selected_profile_id.clone() else {
        return entry;
    };
    if let McpConfig::Pipedream(pd) = &mut entry.config {
        if let Some(slug) = pd.app_slug() {
            entry.qualified_name = format!("pipedream_{slug}_{profile_id}");
        }
        pd.profile_id = Some(profile_id);
    }
    entry
}

/// Replace the entry sharing `updated.qualified_name`. A pipedream entry
/// moved to another profile takes over that profile: any other entry bound
/// to it is dropped, as in [`add_from_registry`].
pub fn save_credentials(list: &[McpConfiguration], updated: McpConfiguration) -> Vec<McpConfiguration> {
    let Some(index) = list.iter().position(|c| c.qualified_name == updated.qualified_name) else {
        tracing::warn!(qualified_name = %updated.qualified_name, "no MCP configuration to receive credentials");
        return list.to_vec();
    };

    let updated = rebind_pipedream(updated);
    let key = updated.key();
    let exclusive = matches!(key, EntryKey::Pipedream { .. });

    let mut next = Vec::with_capacity(list.len());
    for (i, c) in list.iter().enumerate() {
        if i == index {
            next.push(updated.clone());
        } else if exclusive && c.matches(&key) {
            tracing::debug!(qualified_name = %c.qualified_name, ?key, "dropping entry bound to the same profile");
        } else {
            next.push(c.clone());
        }
    }
    next
}

pub fn tools_target(entry: &McpConfiguration) -> Option<ToolsTarget> {
    match entry.custom_type() {
        Some(CustomType::Pipedream) => match entry.pipedream_profile_id() {
            Some(profile_id) => Some(ToolsTarget::Pipedream {
                profile_id: profile_id.to_string(),
                app_name: entry.name.clone(),
            }),
            None => {
                tracing::warn!(qualified_name = %entry.qualified_name, "pipedream entry has no credential profile");
                None
            }
        },
        _ => Some(ToolsTarget::Custom {
            name: entry.name.clone(),
            config: entry.config.to_map(),
        }),
    }
}
