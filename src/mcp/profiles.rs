//! Saved credential profiles offered by the credential editor.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http_client::{FetchError, InterceptingClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProfile {
    pub profile_id: String,
    pub profile_name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[async_trait]
pub trait CredentialProfileSource: Send + Sync {
    async fn profiles_for(&self, qualified_name: &str) -> Result<Vec<CredentialProfile>, FetchError>;
}

pub struct HttpProfileSource {
    client: InterceptingClient,
    base: reqwest::Url,
}

impl HttpProfileSource {
    pub fn new(client: InterceptingClient, base: reqwest::Url) -> Self {
        Self { client, base }
    }
}

#[async_trait]
impl CredentialProfileSource for HttpProfileSource {
    async fn profiles_for(&self, qualified_name: &str) -> Result<Vec<CredentialProfile>, FetchError> {
        let mut url = self.base.clone();
        // Push the name as one segment so `@scope/name` stays intact.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["secure-mcp", "credential-profiles", qualified_name]);
        }
        self.client.get_json(url).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticProfileSource {
    profiles: HashMap<String, Vec<CredentialProfile>>,
}

impl StaticProfileSource {
    pub fn new(profiles: HashMap<String, Vec<CredentialProfile>>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl CredentialProfileSource for StaticProfileSource {
    async fn profiles_for(&self, qualified_name: &str) -> Result<Vec<CredentialProfile>, FetchError> {
        Ok(self.profiles.get(qualified_name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::testing::Canned;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn http_source_escapes_scoped_names() {
        let client = InterceptingClient::new(reqwest::Client::new());
        client.install(Arc::new(Canned {
            needle: "/api/secure-mcp/credential-profiles/@smithery%2Fgithub",
            status: http::StatusCode::OK,
            body: json!([{ "profile_id": "p1", "profile_name": "Work", "is_default": true }]),
        }));

        let source = HttpProfileSource::new(client, "http://backend.invalid/api/".parse().unwrap());
        let profiles = source.profiles_for("@smithery/github").await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].profile_name, "Work");
        assert!(profiles[0].is_default);
    }

    #[tokio::test]
    async fn static_source_defaults_to_empty() {
        let source = StaticProfileSource::new(HashMap::from([(
            "exa".to_string(),
            vec![CredentialProfile {
                profile_id: "p".into(),
                profile_name: "P".into(),
                is_default: false,
            }],
        )]));
        assert_eq!(source.profiles_for("exa").await.unwrap().len(), 1);
        assert!(source.profiles_for("other").await.unwrap().is_empty());
    }
}
