// Agent Integrations - runtime configuration
//! Settings read from the environment (and `.env` via dotenvy in `main`).
//!
//! | Variable              | Default                     |
//! |-----------------------|-----------------------------|
//! | `PORT`                | `8081`                      |
//! | `DATABASE_URL`        | unset: in-memory stores     |
//! | `AUTH_SECRET`         | unset: auth disabled        |
//! | `FLAGS_FILE`          | `data/feature_flags.json`   |
//! | `FLAG_INTERCEPT_MODE` | `per_flag` (`fixed`, `off`) |
//! | `FORCE_ENABLED_FLAGS` | empty, comma-separated      |
//! | `REGISTRY_URL`        | unset: empty server browser |
//! | `PROFILES_URL`        | unset: no saved profiles    |
//! | `DEFAULT_LANGUAGE`    | `pt-BR`                     |

use std::path::PathBuf;

use url::Url;

use crate::flags::intercept::{parse_mode, InterceptMode, ParseModeError};
use crate::i18n::{Language, UnknownLanguage};

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_FLAGS_FILE: &str = "data/feature_flags.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("PORT is not a valid port number: {0}")]
    Port(String),
    #[error("{var} is not a valid URL: {source}")]
    Url {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("FLAG_INTERCEPT_MODE: {0}")]
    InterceptMode(#[from] ParseModeError),
    #[error("DEFAULT_LANGUAGE: {0}")]
    Language(#[from] UnknownLanguage),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub auth_secret: Option<String>,
    /// `None` keeps flags in memory only.
    pub flags_file: Option<PathBuf>,
    /// `None` installs no flag interceptor.
    pub intercept_mode: Option<InterceptMode>,
    pub forced_flags: Vec<String>,
    pub registry_url: Option<Url>,
    pub profiles_url: Option<Url>,
    pub default_language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            auth_secret: None,
            flags_file: None,
            intercept_mode: Some(InterceptMode::PerFlag),
            forced_flags: Vec::new(),
            registry_url: None,
            profiles_url: None,
            default_language: Language::PtBr,
        }
    }
}

fn parse_url(var: &'static str, raw: Option<String>) -> Result<Option<Url>, ConfigLoadError> {
    raw.map(|s| Url::parse(&s).map_err(|source| ConfigLoadError::Url { var, source }))
        .transpose()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigLoadError::Port(raw))?,
            None => DEFAULT_PORT,
        };

        let intercept_mode = match get("FLAG_INTERCEPT_MODE") {
            Some(raw) => parse_mode(&raw)?,
            None => Some(InterceptMode::PerFlag),
        };

        let default_language = match get("DEFAULT_LANGUAGE") {
            Some(raw) => raw.parse()?,
            None => Language::PtBr,
        };

        let forced_flags = get("FORCE_ENABLED_FLAGS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            auth_secret: get("AUTH_SECRET"),
            flags_file: Some(get("FLAGS_FILE").unwrap_or_else(|| DEFAULT_FLAGS_FILE.to_string()).into()),
            intercept_mode,
            forced_flags,
            registry_url: parse_url("REGISTRY_URL", get("REGISTRY_URL"))?,
            profiles_url: parse_url("PROFILES_URL", get("PROFILES_URL"))?,
            default_language,
        })
    }
}
