use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::mcp::model::{EntryKey, McpConfiguration};

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub app: String,
    pub uptime_seconds: u64,
    pub storage: String,
    pub auth_required: bool,
}

// ---------------------------------------------------------------------------
// MCP configuration requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigurationList {
    pub configurations: Vec<McpConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsUpdateRequest {
    pub key: EntryKey,
    pub enabled_tools: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialFormRequest {
    pub qualified_name: String,
    #[serde(default)]
    pub reveal: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowseTab {
    #[default]
    Popular,
    All,
}

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub tab: BrowseTab,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

// ---------------------------------------------------------------------------
// i18n / flags requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LanguageUpdate {
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub struct TranslateQuery {
    pub key: String,
    #[serde(default)]
    pub lang: Option<Language>,
}

#[derive(Debug, Deserialize)]
pub struct FlagUpdate {
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}
