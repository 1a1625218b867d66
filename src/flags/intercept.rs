//! Answers feature-flag lookups made through the shared HTTP client.

use std::str::FromStr;

use serde_json::json;

use super::forced::FlagOverrides;
use crate::http_client::{json_response, RequestInterceptor};

pub const FEATURE_FLAG_PATH: &str = "/feature-flags/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptMode {
    /// Every flag lookup gets `{"flag_name": "custom_agents", "enabled": true}`.
    Fixed,
    /// Overridden flags are answered with their own name and forced value;
    /// anything else goes to the network.
    PerFlag,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown intercept mode '{0}' (expected fixed, per_flag or off)")]
pub struct ParseModeError(String);

/// Parses a configured mode. `off` yields `None`.
pub fn parse_mode(raw: &str) -> Result<Option<InterceptMode>, ParseModeError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "none" | "disabled" => Ok(None),
        other => other.parse().map(Some),
    }
}

impl FromStr for InterceptMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "legacy" => Ok(InterceptMode::Fixed),
            "per_flag" | "per-flag" | "perflag" => Ok(InterceptMode::PerFlag),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

pub struct FeatureFlagInterceptor {
    mode: InterceptMode,
    overrides: FlagOverrides,
}

impl FeatureFlagInterceptor {
    pub fn new(mode: InterceptMode, overrides: FlagOverrides) -> Self {
        Self { mode, overrides }
    }
}

/// Flag name from a `.../feature-flags/<name>` URL.
fn requested_flag(url: &reqwest::Url) -> Option<String> {
    url.path_segments()?
        .skip_while(|s| *s != "feature-flags")
        .nth(1)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl RequestInterceptor for FeatureFlagInterceptor {
    fn name(&self) -> &str {
        "feature-flags"
    }

    fn intercept(&self, request: &reqwest::Request) -> Option<http::Response<Vec<u8>>> {
        if !request.url().as_str().contains(FEATURE_FLAG_PATH) {
            return None;
        }
        let body = match self.mode {
            InterceptMode::Fixed => json!({ "flag_name": "custom_agents", "enabled": true }),
            InterceptMode::PerFlag => {
                let flag = requested_flag(request.url())?;
                if !self.overrides.is_overridden(&flag) {
                    return None;
                }
                json!({ "flag_name": flag, "enabled": self.overrides.value_of(&flag) })
            }
        };
        Some(json_response(http::StatusCode::OK, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> reqwest::Request {
        reqwest::Client::new().get(url).build().unwrap()
    }

    fn body(resp: http::Response<Vec<u8>>) -> serde_json::Value {
        assert_eq!(resp.status(), http::StatusCode::OK);
        serde_json::from_slice(resp.body()).unwrap()
    }

    #[test]
    fn fixed_mode_answers_every_flag_with_custom_agents() {
        let interceptor = FeatureFlagInterceptor::new(InterceptMode::Fixed, FlagOverrides::builtin());
        let resp = interceptor
            .intercept(&get("https://api.example.com/api/feature-flags/dark_mode"))
            .unwrap();
        assert_eq!(body(resp), json!({ "flag_name": "custom_agents", "enabled": true }));
    }

    #[test]
    fn per_flag_mode_echoes_overridden_flag() {
        let interceptor = FeatureFlagInterceptor::new(InterceptMode::PerFlag, FlagOverrides::builtin());
        let resp = interceptor
            .intercept(&get("https://api.example.com/api/feature-flags/marketplaceEnabled"))
            .unwrap();
        assert_eq!(body(resp), json!({ "flag_name": "marketplaceEnabled", "enabled": true }));

        let resp = interceptor
            .intercept(&get("https://api.example.com/api/feature-flags/secure_mcp"))
            .unwrap();
        assert_eq!(body(resp), json!({ "flag_name": "secure_mcp", "enabled": true }));
    }

    #[test]
    fn per_flag_mode_passes_unknown_flags_through() {
        let interceptor = FeatureFlagInterceptor::new(InterceptMode::PerFlag, FlagOverrides::builtin());
        assert!(interceptor
            .intercept(&get("https://api.example.com/api/feature-flags/dark_mode"))
            .is_none());
        assert!(interceptor
            .intercept(&get("https://api.example.com/api/feature-flags/"))
            .is_none());
    }

    #[test]
    fn other_urls_are_never_touched() {
        let interceptor = FeatureFlagInterceptor::new(InterceptMode::Fixed, FlagOverrides::builtin());
        assert!(interceptor.intercept(&get("https://api.example.com/api/agents")).is_none());
        assert!(interceptor.intercept(&get("https://api.example.com/feature-flags")).is_none());
    }

    #[test]
    fn modes_parse_from_config_strings() {
        assert_eq!(parse_mode("fixed").unwrap(), Some(InterceptMode::Fixed));
        assert_eq!(parse_mode("PER_FLAG").unwrap(), Some(InterceptMode::PerFlag));
        assert_eq!(parse_mode("off").unwrap(), None);
        assert!(parse_mode("sometimes").is_err());
    }
}
