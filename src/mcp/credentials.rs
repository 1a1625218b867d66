//! Credential editing for a single MCP entry.
//!
//! A form works on a copy of the entry's config map. Nothing reaches the
//! entry until [`CredentialForm::finish`], and the caller then hands the
//! result to [`super::editor::save_credentials`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::model::{ConfigError, McpConfig, McpConfiguration};
use super::profiles::CredentialProfile;

pub const MASK: &str = "***********";

// ── Field catalog ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialField {
    pub key: &'static str,
    pub label: &'static str,
    pub sensitive: bool,
}

const API_KEY: CredentialField = CredentialField {
    key: "api_key",
    label: "API Key",
    sensitive: true,
};

const CATALOG: &[(&str, CredentialField)] = &[
    (
        "github",
        CredentialField {
            key: "github_token",
            label: "GitHub Token",
            sensitive: true,
        },
    ),
    (
        "slack",
        CredentialField {
            key: "slack_token",
            label: "Slack Token",
            sensitive: true,
        },
    ),
    (
        "notion",
        CredentialField {
            key: "notion_token",
            label: "Notion Token",
            sensitive: true,
        },
    ),
];

/// Field a registry server needs, picked by substring of its qualified name.
pub fn catalog_field(qualified_name: &str) -> CredentialField {
    let name = qualified_name.to_ascii_lowercase();
    CATALOG
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, field)| *field)
        .unwrap_or(API_KEY)
}

/// Fields the manual form asks for. Pipedream entries get their credentials
/// from the selected profile.
pub fn required_fields(entry: &McpConfiguration) -> Vec<CredentialField> {
    match &entry.config {
        McpConfig::Http(_) | McpConfig::Sse(_) => vec![API_KEY],
        McpConfig::Pipedream(_) => Vec::new(),
        McpConfig::Registry(_) => vec![catalog_field(&entry.qualified_name)],
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["token", "key", "secret"].iter().any(|needle| key.contains(needle))
}

/// Copy of `config` with secret-looking values replaced by [`MASK`].
pub fn masked(config: &Map<String, Value>) -> Map<String, Value> {
    config
        .iter()
        .map(|(k, v)| {
            let v = if is_secret_key(k) {
                Value::String(MASK.to_string())
            } else {
                v.clone()
            };
            (k.clone(), v)
        })
        .collect()
}

// ── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    ProfileSelector,
    Manual,
}

#[derive(Debug, Clone)]
pub struct CredentialForm {
    original: McpConfiguration,
    config: Map<String, Value>,
    selected_profile_id: Option<String>,
    profiles: Vec<CredentialProfile>,
    fields: Vec<CredentialField>,
}

/// Serializable snapshot of a form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFormView {
    pub name: String,
    pub qualified_name: String,
    pub mode: FormMode,
    pub fields: Vec<CredentialField>,
    pub profiles: Vec<CredentialProfile>,
    pub selected_profile_id: Option<String>,
    pub shows_manual_fields: bool,
    pub preview: Map<String, Value>,
}

/// Body of a credential save request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialUpdate {
    pub qualified_name: String,
    #[serde(default)]
    pub config: Option<Map<String, Value>>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Absent keeps the current profile, `null` or `""` clears it.
    #[serde(default, deserialize_with = "present")]
    pub selected_profile_id: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl CredentialForm {
    pub fn open(entry: McpConfiguration, profiles: Vec<CredentialProfile>) -> Self {
        Self {
            config: entry.config.to_map(),
            selected_profile_id: entry.selected_profile_id.clone(),
            fields: required_fields(&entry),
            original: entry,
            profiles,
        }
    }

    pub fn mode(&self) -> FormMode {
        if self.profiles.is_empty() {
            FormMode::Manual
        } else {
            FormMode::ProfileSelector
        }
    }

    pub fn shows_manual_fields(&self) -> bool {
        self.selected_profile_id.is_none() || self.profiles.is_empty()
    }

    pub fn fields(&self) -> &[CredentialField] {
        &self.fields
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn selected_profile_id(&self) -> Option<&str> {
        self.selected_profile_id.as_deref()
    }

    /// An empty id clears the selection.
    pub fn select_profile(&mut self, profile_id: Option<&str>) {
        self.selected_profile_id = profile_id.filter(|id| !id.is_empty()).map(str::to_string);
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) {
        self.config.insert(key.to_string(), Value::String(value.into()));
    }

    pub fn replace_config(&mut self, config: Map<String, Value>) {
        self.config = config;
    }

    /// Replace the working config from free text. Anything that is not a JSON
    /// object is ignored and `false` is returned.
    pub fn replace_raw(&mut self, text: &str) -> bool {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                self.config = map;
                true
            }
            _ => false,
        }
    }

    pub fn preview(&self, reveal: bool) -> Map<String, Value> {
        if reveal {
            self.config.clone()
        } else {
            masked(&self.config)
        }
    }

    fn has_credentials(&self) -> bool {
        self.selected_profile_id.is_some()
            || self.fields.iter().all(|f| {
                self.config
                    .get(f.key)
                    .and_then(Value::as_str)
                    .is_some_and(|v| !v.is_empty())
            })
    }

    /// Build the updated entry, failing if the working config no longer fits
    /// the entry's kind.
    pub fn try_finish(self) -> Result<McpConfiguration, ConfigError> {
        let complete = self.has_credentials();
        let mut config = McpConfig::from_map(self.original.custom_type(), self.config)?;
        if let McpConfig::Registry(reg) = &mut config {
            if complete {
                reg.requires_config = false;
            }
        }
        Ok(McpConfiguration {
            config,
            selected_profile_id: self.selected_profile_id,
            ..self.original
        })
    }

    /// Like [`Self::try_finish`], keeping the previous config when the working
    /// copy does not validate.
    pub fn finish(self) -> McpConfiguration {
        let fallback = McpConfiguration {
            selected_profile_id: self.selected_profile_id.clone(),
            ..self.original.clone()
        };
        match self.try_finish() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, qualified_name = %fallback.qualified_name, "keeping previous config");
                fallback
            }
        }
    }

    pub fn view(&self, reveal: bool) -> CredentialFormView {
        CredentialFormView {
            name: self.original.name.clone(),
            qualified_name: self.original.qualified_name.clone(),
            mode: self.mode(),
            fields: self.fields.clone(),
            profiles: self.profiles.clone(),
            selected_profile_id: self.selected_profile_id.clone(),
            shows_manual_fields: self.shows_manual_fields(),
            preview: self.preview(reveal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::editor::browser_entry;
    use crate::mcp::registry::RegistryServer;
    use serde_json::json;

    fn registry_entry(qn: &str) -> McpConfiguration {
        browser_entry(&RegistryServer {
            qualified_name: qn.into(),
            display_name: qn.into(),
            description: String::new(),
            icon_url: None,
            is_deployed: true,
            use_count: 0,
            created_at: None,
        })
    }

    fn profile(id: &str) -> CredentialProfile {
        CredentialProfile {
            profile_id: id.into(),
            profile_name: format!("Profile {id}"),
            is_default: false,
        }
    }

    #[test]
    fn catalog_matches_qualified_name() {
        assert_eq!(catalog_field("@smithery/github").key, "github_token");
        assert_eq!(catalog_field("slack-bot").label, "Slack Token");
        assert_eq!(catalog_field("NOTION").key, "notion_token");
        let fallback = catalog_field("exa");
        assert_eq!(fallback, API_KEY);
        assert!(fallback.sensitive);
    }

    #[test]
    fn fields_depend_on_entry_kind() {
        assert_eq!(required_fields(&registry_entry("@smithery/github"))[0].key, "github_token");

        let pipedream: McpConfiguration = serde_json::from_value(json!({
            "name": "Slack",
            "qualifiedName": "pipedream_slack_p1",
            "config": { "url": "https://remote.mcp.pipedream.net" },
            "customType": "pipedream"
        }))
        .unwrap();
        assert!(required_fields(&pipedream).is_empty());

        let custom: McpConfiguration = serde_json::from_value(json!({
            "name": "Slack mirror",
            "qualifiedName": "custom_http_1",
            "config": { "url": "https://mcp.example.com" },
            "customType": "http"
        }))
        .unwrap();
        assert_eq!(required_fields(&custom), vec![API_KEY]);
    }

    #[test]
    fn preview_masks_secret_keys_only() {
        let mut form = CredentialForm::open(registry_entry("exa"), vec![]);
        form.set_field("api_key", "sk-live");
        form.set_field("region", "eu");

        let preview = form.preview(false);
        assert_eq!(preview["api_key"], MASK);
        assert_eq!(preview["region"], "eu");
        assert_eq!(form.preview(true)["api_key"], "sk-live");
    }

    #[test]
    fn malformed_raw_text_keeps_working_copy() {
        let mut form = CredentialForm::open(registry_entry("exa"), vec![]);
        form.set_field("api_key", "abc");

        assert!(!form.replace_raw("{not json"));
        assert!(!form.replace_raw("[1, 2]"));
        assert_eq!(form.config()["api_key"], "abc");

        assert!(form.replace_raw(r#"{"serverUrl":"https://x/mcp","api_key":"def"}"#));
        assert_eq!(form.config()["api_key"], "def");
    }

    #[test]
    fn mode_depends_on_available_profiles() {
        let manual = CredentialForm::open(registry_entry("exa"), vec![]);
        assert_eq!(manual.mode(), FormMode::Manual);
        assert!(manual.shows_manual_fields());

        let mut picker = CredentialForm::open(registry_entry("exa"), vec![profile("a")]);
        assert_eq!(picker.mode(), FormMode::ProfileSelector);
        assert!(picker.shows_manual_fields());
        picker.select_profile(Some("a"));
        assert!(!picker.shows_manual_fields());
        picker.select_profile(Some(""));
        assert_eq!(picker.selected_profile_id(), None);
    }

    #[test]
    fn finish_clears_requires_config_once_fields_are_filled() {
        let mut form = CredentialForm::open(registry_entry("@smithery/github"), vec![]);
        let untouched = form.clone().finish();
        assert!(matches!(untouched.config, McpConfig::Registry(ref r) if r.requires_config));

        form.set_field("github_token", "ghp_1");
        let done = form.finish();
        let McpConfig::Registry(reg) = &done.config else {
            panic!("expected registry config");
        };
        assert!(!reg.requires_config);
        assert_eq!(reg.extra["github_token"], "ghp_1");
    }

    #[test]
    fn finish_with_profile_records_selection() {
        let mut form = CredentialForm::open(registry_entry("exa"), vec![profile("p1")]);
        form.select_profile(Some("p1"));
        let done = form.finish();
        assert_eq!(done.selected_profile_id.as_deref(), Some("p1"));
        assert!(matches!(done.config, McpConfig::Registry(ref r) if !r.requires_config));
    }

    #[test]
    fn invalid_working_copy_falls_back_to_previous_config() {
        let entry = registry_entry("exa");
        let mut form = CredentialForm::open(entry.clone(), vec![]);
        form.replace_config(json!({ "api_key": "k" }).as_object().unwrap().clone());

        assert!(form.clone().try_finish().is_err());
        assert_eq!(form.finish().config, entry.config);
    }

    #[test]
    fn view_masks_by_default() {
        let mut form = CredentialForm::open(registry_entry("exa"), vec![profile("p")]);
        form.set_field("api_key", "secret");
        let view = form.view(false);
        assert_eq!(view.preview["api_key"], MASK);
        assert_eq!(view.mode, FormMode::ProfileSelector);
        let body = serde_json::to_value(&view).unwrap();
        assert_eq!(body["mode"], "profile_selector");
        assert_eq!(body["qualifiedName"], "exa");
    }
}
