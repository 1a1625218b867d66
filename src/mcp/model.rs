//! Typed MCP configuration entries.
//!
//! On the wire an entry is the camelCase object the frontend has always sent
//! (`qualifiedName`, `enabledTools`, `customType`, a free-form `config`
//! object). In memory the `config` object is a tagged union keyed by
//! `customType`, so each integration kind declares the fields it needs.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PIPEDREAM_MCP_URL: &str = "https://remote.mcp.pipedream.net";
pub const PIPEDREAM_APP_SLUG_HEADER: &str = "x-pd-app-slug";
pub const SMITHERY_SERVER_BASE: &str = "https://server.smithery.ai";

// ── Custom type ─────────────────────────────────────────────────────────────

/// `customType` of an entry. Registry-sourced entries have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomType {
    Http,
    Sse,
    Pipedream,
}

impl CustomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomType::Http => "http",
            CustomType::Sse => "sse",
            CustomType::Pipedream => "pipedream",
        }
    }
}

impl fmt::Display for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {kind} config: {source}")]
    Invalid {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// ── Per-kind config bodies ──────────────────────────────────────────────────

/// Body of an `http` or `sse` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a `pipedream` entry. The app slug travels as a request header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipedreamConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PipedreamConfig {
    pub fn app_slug(&self) -> Option<&str> {
        self.headers.get(PIPEDREAM_APP_SLUG_HEADER).map(String::as_str)
    }
}

/// Body of an entry picked from the server browser. Credential values land
/// in `extra` once the user supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(rename = "serverUrl")]
    pub server_url: String,
    #[serde(rename = "requiresConfig", default)]
    pub requires_config: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `config` object, typed by `customType`.
#[derive(Debug, Clone, PartialEq)]
pub enum McpConfig {
    Http(HttpConfig),
    Sse(HttpConfig),
    Pipedream(PipedreamConfig),
    Registry(RegistryConfig),
}

fn decode<T: DeserializeOwned>(kind: &'static str, map: Map<String, Value>) -> Result<T, ConfigError> {
    serde_json::from_value(Value::Object(map)).map_err(|source| ConfigError::Invalid { kind, source })
}

fn encode<T: Serialize>(body: &T) -> Map<String, Value> {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

impl McpConfig {
    /// Validate a raw mapping into the variant selected by `custom_type`.
    pub fn from_map(custom_type: Option<CustomType>, map: Map<String, Value>) -> Result<Self, ConfigError> {
        Ok(match custom_type {
            Some(CustomType::Http) => McpConfig::Http(decode("http", map)?),
            Some(CustomType::Sse) => McpConfig::Sse(decode("sse", map)?),
            Some(CustomType::Pipedream) => McpConfig::Pipedream(decode("pipedream", map)?),
            None => McpConfig::Registry(decode("registry", map)?),
        })
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match self {
            McpConfig::Http(c) | McpConfig::Sse(c) => encode(c),
            McpConfig::Pipedream(c) => encode(c),
            McpConfig::Registry(c) => encode(c),
        }
    }

    pub fn custom_type(&self) -> Option<CustomType> {
        match self {
            McpConfig::Http(_) => Some(CustomType::Http),
            McpConfig::Sse(_) => Some(CustomType::Sse),
            McpConfig::Pipedream(_) => Some(CustomType::Pipedream),
            McpConfig::Registry(_) => None,
        }
    }
}

// ── Entry ───────────────────────────────────────────────────────────────────

/// One integration attached to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireConfiguration", into = "WireConfiguration")]
pub struct McpConfiguration {
    pub name: String,
    pub qualified_name: String,
    pub config: McpConfig,
    pub enabled_tools: Vec<String>,
    pub selected_profile_id: Option<String>,
    pub is_custom: bool,
}

/// Natural key used to find an entry again after the list was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum EntryKey {
    /// `(customType = pipedream, selectedProfileId)`.
    Pipedream { profile_id: String },
    QualifiedName { qualified_name: String },
}

impl McpConfiguration {
    pub fn custom_type(&self) -> Option<CustomType> {
        self.config.custom_type()
    }

    pub fn key(&self) -> EntryKey {
        match (&self.config, &self.selected_profile_id) {
            (McpConfig::Pipedream(_), Some(profile_id)) => EntryKey::Pipedream {
                profile_id: profile_id.clone(),
            },
            _ => EntryKey::QualifiedName {
                qualified_name: self.qualified_name.clone(),
            },
        }
    }

    pub fn matches(&self, key: &EntryKey) -> bool {
        match key {
            EntryKey::Pipedream { profile_id } => {
                matches!(self.config, McpConfig::Pipedream(_))
                    && self.selected_profile_id.as_deref() == Some(profile_id.as_str())
            }
            EntryKey::QualifiedName { qualified_name } => &self.qualified_name == qualified_name,
        }
    }

    /// Credential profile backing a pipedream entry: the selected profile, or
    /// the one recorded in its config.
    pub fn pipedream_profile_id(&self) -> Option<&str> {
        match &self.config {
            McpConfig::Pipedream(c) => self
                .selected_profile_id
                .as_deref()
                .or(c.profile_id.as_deref())
                .filter(|id| !id.is_empty()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireConfiguration {
    name: String,
    qualified_name: String,
    #[serde(default)]
    config: Option<Map<String, Value>>,
    #[serde(default)]
    enabled_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_profile_id: Option<String>,
    #[serde(default)]
    is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_type: Option<CustomType>,
}

impl TryFrom<WireConfiguration> for McpConfiguration {
    type Error = ConfigError;

    fn try_from(wire: WireConfiguration) -> Result<Self, Self::Error> {
        let config = McpConfig::from_map(wire.custom_type, wire.config.unwrap_or_default())?;
        Ok(Self {
            name: wire.name,
            qualified_name: wire.qualified_name,
            config,
            enabled_tools: wire.enabled_tools,
            selected_profile_id: wire.selected_profile_id.filter(|id| !id.is_empty()),
            is_custom: wire.is_custom,
        })
    }
}

impl From<McpConfiguration> for WireConfiguration {
    fn from(entry: McpConfiguration) -> Self {
        Self {
            custom_type: entry.config.custom_type(),
            config: Some(entry.config.to_map()),
            name: entry.name,
            qualified_name: entry.qualified_name,
            enabled_tools: entry.enabled_tools,
            selected_profile_id: entry.selected_profile_id,
            is_custom: entry.is_custom,
        }
    }
}
