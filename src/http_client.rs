// Agent Integrations - outbound HTTP
//! Shared outbound HTTP client with a pluggable request interception seam.
//!
//! Interceptors are consulted in installation order before every request.
//! The first one that returns a response short-circuits the network call;
//! otherwise the request goes to the real client unchanged. Nothing global is
//! patched: only requests made through [`InterceptingClient`] are affected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use http::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Answers a request locally instead of sending it.
pub trait RequestInterceptor: Send + Sync {
    fn name(&self) -> &str;

    /// `Some` to short-circuit, `None` to pass the request on.
    fn intercept(&self, request: &reqwest::Request) -> Option<http::Response<Vec<u8>>>;
}

/// Handle returned by [`InterceptingClient::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterceptorId(u64);

type Installed = Vec<(InterceptorId, Arc<dyn RequestInterceptor>)>;

#[derive(Clone)]
pub struct InterceptingClient {
    inner: reqwest::Client,
    interceptors: Arc<RwLock<Installed>>,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

impl InterceptingClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self {
            inner,
            interceptors: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Client with the service's default timeouts.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("agent-integrations/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(inner))
    }

    pub fn install(&self, interceptor: Arc<dyn RequestInterceptor>) -> InterceptorId {
        let id = InterceptorId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(interceptor = interceptor.name(), "request interceptor installed");
        self.interceptors
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push((id, interceptor));
        id
    }

    /// Returns `false` when `id` was not installed.
    pub fn remove(&self, id: InterceptorId) -> bool {
        let mut installed = self.interceptors.write().unwrap_or_else(|p| p.into_inner());
        let before = installed.len();
        installed.retain(|(i, _)| *i != id);
        installed.len() != before
    }

    pub fn installed(&self) -> usize {
        self.interceptors.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Builder on the underlying client; send it with [`Self::send`].
    pub fn request(&self, method: reqwest::Method, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    fn answer(&self, request: &reqwest::Request) -> Option<(String, http::Response<Vec<u8>>)> {
        let installed = self.interceptors.read().unwrap_or_else(|p| p.into_inner());
        installed
            .iter()
            .find_map(|(_, i)| i.intercept(request).map(|resp| (i.name().to_string(), resp)))
    }

    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response, reqwest::Error> {
        if let Some((name, canned)) = self.answer(&request) {
            tracing::debug!(interceptor = %name, url = %request.url(), "request answered locally");
            return Ok(reqwest::Response::from(canned));
        }
        self.inner.execute(request).await
    }

    pub async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, reqwest::Error> {
        let request = builder.build()?;
        self.execute(request).await
    }

    /// GET `url` and decode a JSON body, treating non-2xx as an error.
    pub async fn get_json<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T, FetchError> {
        let resp = self.send(self.request(reqwest::Method::GET, url)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(resp.json::<T>().await?)
    }
}

/// Canned JSON response for interceptors.
pub fn json_response(status: http::StatusCode, body: &Value) -> http::Response<Vec<u8>> {
    let mut resp = http::Response::new(serde_json::to_vec(body).unwrap_or_default());
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}


#[cfg(test)]
mod tests {
    use super::testing::Canned;
    use super::*;
    use axum::routing::get;
    use serde_json::json;

    fn canned(needle: &'static str, body: Value) -> Arc<dyn RequestInterceptor> {
        Arc::new(Canned {
            needle,
            status: http::StatusCode::OK,
            body,
        })
    }

    #[tokio::test]
    async fn first_matching_interceptor_wins() {
        let client = InterceptingClient::new(reqwest::Client::new());
        client.install(canned("/a/", json!({ "from": "first" })));
        client.install(canned("/a/", json!({ "from": "second" })));

        let url: reqwest::Url = "http://intercepted.invalid/a/b".parse().unwrap();
        let body: Value = client.get_json(url).await.unwrap();
        assert_eq!(body["from"], "first");
    }

    #[tokio::test]
    async fn removed_interceptor_no_longer_answers() {
        let client = InterceptingClient::new(reqwest::Client::new());
        let first = client.install(canned("/a/", json!({ "from": "first" })));
        client.install(canned("/a/", json!({ "from": "second" })));
        assert!(client.remove(first));
        assert!(!client.remove(first));
        assert_eq!(client.installed(), 1);

        let url: reqwest::Url = "http://intercepted.invalid/a/b".parse().unwrap();
        let body: Value = client.get_json(url).await.unwrap();
        assert_eq!(body["from"], "second");
    }

    #[tokio::test]
    async fn canned_error_status_surfaces_as_fetch_error() {
        let client = InterceptingClient::new(reqwest::Client::new());
        client.install(Arc::new(Canned {
            needle: "/down",
            status: http::StatusCode::SERVICE_UNAVAILABLE,
            body: json!({}),
        }));
        let url: reqwest::Url = "http://intercepted.invalid/down".parse().unwrap();
        let err = client.get_json::<Value>(url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(503)));
    }

    #[tokio::test]
    async fn unmatched_requests_reach_the_network() {
        let app = axum::Router::new().route("/real", get(|| async { axum::Json(json!({ "real": true })) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = InterceptingClient::new(reqwest::Client::builder().no_proxy().build().unwrap());
        client.install(canned("/feature-flags/", json!({ "enabled": true })));

        let url: reqwest::Url = format!("http://{addr}/real").parse().unwrap();
        let body: Value = client.get_json(url).await.unwrap();
        assert_eq!(body["real"], true);
    }
}
