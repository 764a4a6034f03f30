/*
[INPUT]:  HTTP configuration (base URL, timeouts, credentials)
[OUTPUT]: Configured reqwest client ready for backend calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::http::{IjazahError, Result};

/// Default backend API root
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Session credential attached to outbound requests
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub wallet_address: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("wallet_address", &self.wallet_address)
            .finish()
    }
}

/// HTTP client for the diploma backend
///
/// Clones share one credential slot, so a logout seen by any clone stops
/// every clone from sending the bearer token.
#[derive(Debug, Clone)]
pub struct IjazahClient {
    http_client: Client,
    base_url: Url,
    timeout: Duration,
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl IjazahClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client against an explicit backend root (tests, staging)
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            timeout: config.timeout,
            credentials: Arc::new(RwLock::new(None)),
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
    }

    /// Drop credentials after logout
    pub fn clear_credentials(&self) {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL from path segments appended to the base path, so `/api`
    /// roots survive. Each segment is percent-encoded on its own; `/`, `?` and
    /// `#` inside a caller-supplied id never change the request target.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(segment.trim(), "" | "." | ".."))
        {
            return Err(IjazahError::InvalidPathParameter((*bad).to_string()));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IjazahError::Config(format!("base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build an unauthenticated request
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        Ok(self.http_client.request(method, url))
    }

    /// Build a request carrying the session credential when one is set
    pub(crate) fn request_with_credentials(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder> {
        let builder = self.request(method, segments)?;
        Ok(match self.credentials() {
            Some(credentials) => builder.bearer_auth(&credentials.token),
            None => builder,
        })
    }

    /// Send and decode a JSON body, mapping non-2xx statuses to `Api` errors
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let body = response.text().await.map_err(|e| self.map_transport(e))?;
        serde_json::from_str(&body).map_err(IjazahError::from)
    }

    /// Send a request whose body is irrelevant (e.g. 204 responses)
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| self.map_transport(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(IjazahError::api_error(status, error_detail(&body)))
    }

    fn map_transport(&self, err: reqwest::Error) -> IjazahError {
        if err.is_timeout() {
            IjazahError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            IjazahError::Http(err)
        }
    }
}

/// Pull the `detail` field out of a backend error body, falling back to the raw text
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.trim().to_string())
}
