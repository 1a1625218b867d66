//! UI string catalogs and the per-installation language preference.
//!
//! Catalogs are nested JSON objects embedded at build time. Lookups use
//! dot-separated keys and fall back to the key itself.

pub mod preferences;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use preferences::{PreferenceError, PreferenceStore};

/// Preference key holding the chosen language.
pub const LANGUAGE_PREFERENCE_KEY: &str = "language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::PtBr, Language::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::PtBr => "pt-BR",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.eq_ignore_ascii_case("pt-BR") || tag.eq_ignore_ascii_case("pt_BR") {
            Ok(Language::PtBr)
        } else if tag.eq_ignore_ascii_case("en") {
            Ok(Language::En)
        } else {
            Err(UnknownLanguage(s.to_string()))
        }
    }
}

// ── Catalogs ────────────────────────────────────────────────────────────────

fn parse_catalog(name: &str, source: &str) -> Value {
    serde_json::from_str(source).unwrap_or_else(|e| {
        tracing::error!(catalog = name, error = %e, "translation catalog is not valid JSON");
        Value::Object(Map::new())
    })
}

static PT_BR: LazyLock<Value> = LazyLock::new(|| parse_catalog("pt-BR", include_str!("../../locales/pt-BR.json")));
static EN: LazyLock<Value> = LazyLock::new(|| parse_catalog("en", include_str!("../../locales/en.json")));

pub fn catalog(language: Language) -> &'static Value {
    match language {
        Language::PtBr => &PT_BR,
        Language::En => &EN,
    }
}

/// Walk `key` through `dict`. Any miss, non-object step or non-string leaf
/// yields `key` unchanged.
pub fn resolve(dict: &Value, key: &str) -> String {
    let mut node = dict;
    for segment in key.split('.') {
        match node.as_object().and_then(|obj| obj.get(segment)) {
            Some(next) => node = next,
            None => return key.to_string(),
        }
    }
    node.as_str().map_or_else(|| key.to_string(), str::to_string)
}

pub fn get_translation(key: &str, language: Language) -> String {
    resolve(catalog(language), key)
}

/// Language from the first `Accept-Language` tag: anything starting with
/// `pt` maps to `pt-BR`, everything else to `fallback`.
pub fn detect_language(accept_language: Option<&str>, fallback: Language) -> Language {
    let first = accept_language
        .and_then(|header| header.split(',').next())
        .map(|tag| tag.split(';').next().unwrap_or("").trim().to_ascii_lowercase());
    match first {
        Some(tag) if tag.starts_with("pt") => Language::PtBr,
        _ => fallback,
    }
}

// ── Translator ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Translator {
    preferences: Arc<dyn PreferenceStore>,
    fallback: Language,
}

impl Translator {
    pub fn new(preferences: Arc<dyn PreferenceStore>, fallback: Language) -> Self {
        Self { preferences, fallback }
    }

    pub fn fallback(&self) -> Language {
        self.fallback
    }

    /// Saved preference if any, else the request locale.
    pub async fn language(&self, accept_language: Option<&str>) -> Language {
        match self.preferences.get(LANGUAGE_PREFERENCE_KEY).await {
            Ok(Some(saved)) => match saved.parse() {
                Ok(language) => return language,
                Err(e) => tracing::warn!(error = %e, "ignoring saved language"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "language preference unavailable"),
        }
        detect_language(accept_language, self.fallback)
    }

    pub async fn change_language(&self, language: Language) -> Result<(), PreferenceError> {
        self.preferences.set(LANGUAGE_PREFERENCE_KEY, language.as_str()).await?;
        tracing::info!(%language, "language preference changed");
        Ok(())
    }

    pub fn t(&self, key: &str, language: Language) -> String {
        get_translation(key, language)
    }
}
