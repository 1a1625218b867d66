//! MCP server directory used by the server browser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http_client::{FetchError, InterceptingClient};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryServer {
    pub qualified_name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub is_deployed: bool,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerPage {
    pub servers: Vec<RegistryServer>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn popular(&self, page: u32, page_size: u32) -> Result<ServerPage, FetchError>;

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<ServerPage, FetchError>;
}

// ── Remote directory ────────────────────────────────────────────────────────

pub struct HttpRegistry {
    client: InterceptingClient,
    base: reqwest::Url,
}

impl HttpRegistry {
    pub fn new(client: InterceptingClient, base: reqwest::Url) -> Self {
        Self { client, base }
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> reqwest::Url {
        let mut url = self.base.clone();
        url.set_path(&format!("{}/{}", self.base.path().trim_end_matches('/'), path));
        url.query_pairs_mut().extend_pairs(params);
        url
    }
}

#[async_trait]
impl RegistrySource for HttpRegistry {
    async fn popular(&self, page: u32, page_size: u32) -> Result<ServerPage, FetchError> {
        let url = self.url(
            "mcp/servers/popular",
            &[("page", page.to_string()), ("pageSize", page_size.to_string())],
        );
        self.client.get_json(url).await
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<ServerPage, FetchError> {
        let url = self.url(
            "mcp/servers",
            &[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        );
        self.client.get_json(url).await
    }
}

// ── Fixed directory ─────────────────────────────────────────────────────────

/// In-process directory, used when no remote registry is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    servers: Vec<RegistryServer>,
}

impl StaticRegistry {
    pub fn new(servers: Vec<RegistryServer>) -> Self {
        Self { servers }
    }

    fn paginate(mut servers: Vec<RegistryServer>, page: u32, page_size: u32) -> ServerPage {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total = servers.len();
        let start = ((page - 1) as usize).saturating_mul(page_size as usize).min(total);
        let end = start.saturating_add(page_size as usize).min(total);
        let total_pages = total.div_ceil(page_size as usize) as u32;
        ServerPage {
            servers: servers.drain(start..end).collect(),
            pagination: Some(Pagination {
                current_page: page,
                page_size,
                total_pages,
                total_count: total as u64,
            }),
        }
    }
}

#[async_trait]
impl RegistrySource for StaticRegistry {
    async fn popular(&self, page: u32, page_size: u32) -> Result<ServerPage, FetchError> {
        let mut servers = self.servers.clone();
        servers.sort_by(|a, b| b.use_count.cmp(&a.use_count));
        Ok(Self::paginate(servers, page, page_size))
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<ServerPage, FetchError> {
        let needle = query.trim().to_lowercase();
        let servers = self
            .servers
            .iter()
            .filter(|s| {
                needle.is_empty()
                    || s.qualified_name.to_lowercase().contains(&needle)
                    || s.display_name.to_lowercase().contains(&needle)
                    || s.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(Self::paginate(servers, page, page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::testing::Canned;
    use serde_json::json;
    use std::sync::Arc;

    fn server(qn: &str, name: &str, uses: u64) -> RegistryServer {
        RegistryServer {
            qualified_name: qn.into(),
            display_name: name.into(),
            description: format!("{name} tools"),
            icon_url: None,
            is_deployed: true,
            use_count: uses,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn static_popular_orders_by_use_count() {
        let registry = StaticRegistry::new(vec![
            server("a", "Alpha", 1),
            server("b", "Beta", 30),
            server("c", "Gamma", 7),
        ]);
        let page = registry.popular(1, 2).await.unwrap();
        let names: Vec<_> = page.servers.iter().map(|s| s.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.total_pages, 2);
        assert_eq!(pagination.total_count, 3);

        let last = registry.popular(2, 2).await.unwrap();
        assert_eq!(last.servers.len(), 1);
        assert!(registry.popular(9, 2).await.unwrap().servers.is_empty());
    }

    #[tokio::test]
    async fn static_search_matches_names_case_insensitively() {
        let registry = StaticRegistry::new(vec![server("@x/github", "GitHub", 1), server("exa", "Exa", 2)]);
        let page = registry.search("GITHUB", 1, 10).await.unwrap();
        assert_eq!(page.servers.len(), 1);
        assert_eq!(page.servers[0].qualified_name, "@x/github");
        assert_eq!(registry.search("", 1, 10).await.unwrap().servers.len(), 2);
    }

    #[tokio::test]
    async fn http_registry_decodes_remote_page() {
        let client = InterceptingClient::new(reqwest::Client::new());
        client.install(Arc::new(Canned {
            needle: "/api/mcp/servers/popular?page=1&pageSize=5",
            status: http::StatusCode::OK,
            body: json!({
                "servers": [{ "qualifiedName": "exa", "displayName": "Exa", "useCount": 3 }],
                "pagination": { "currentPage": 1, "pageSize": 5, "totalPages": 1, "totalCount": 1 }
            }),
        }));

        let registry = HttpRegistry::new(client, "http://backend.invalid/api/".parse().unwrap());
        let page = registry.popular(1, 5).await.unwrap();
        assert_eq!(page.servers[0].display_name, "Exa");
        assert_eq!(page.servers[0].use_count, 3);
    }
}
