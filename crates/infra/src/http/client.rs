use std::time::Duration;

use allsee_domain::{AllSeeError, ApiConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use tracing::debug;
use url::Url;

use super::{Headers, NetworkError};
use crate::errors::InfraError;

/// Injected transport capability
///
/// A call either yields the body of a 2xx response or a [`NetworkError`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request
    ///
    /// # Errors
    /// Returns `NetworkError::BadServerResponse` for non-2xx statuses and
    /// the matching transport variant for anything that fails earlier.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, NetworkError>;

    /// Issue a POST request with a URL-encoded form body
    ///
    /// The caller supplies `Content-Type` through `headers`.
    ///
    /// # Errors
    /// Same as [`HttpTransport::get`].
    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        form: &[(String, String)],
    ) -> Result<Vec<u8>, NetworkError>;
}

/// HTTP client with timeout support.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, AllSeeError> {
        Self::builder().build()
    }

    /// Client using the timeout from the API configuration.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AllSeeError> {
        Self::builder().timeout(Duration::from_secs(config.timeout_seconds)).build()
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Vec<u8>, NetworkError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            NetworkError::from(err)
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        if !status.is_success() {
            let body = response.bytes().await.ok().map(|bytes| bytes.to_vec());
            return Err(NetworkError::BadServerResponse { status_code: status.as_u16(), body });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl HttpTransport for HttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, NetworkError> {
        let url = validate_url(url)?;
        let headers = header_map(headers)?;

        self.execute(self.client.get(url).headers(headers)).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        form: &[(String, String)],
    ) -> Result<Vec<u8>, NetworkError> {
        let url = validate_url(url)?;
        let headers = header_map(headers)?;
        let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(form).finish();

        self.execute(self.client.post(url).headers(headers).body(body)).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(allsee_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, AllSeeError> {
        let agent = self
            .user_agent
            .unwrap_or_else(|| format!("allsee/{}", env!("CARGO_PKG_VERSION")));
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy().user_agent(agent);

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            AllSeeError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}

/// Reject malformed or unsupported URLs before any I/O.
fn validate_url(raw: &str) -> Result<Url, NetworkError> {
    let url = Url::parse(raw).map_err(|_| NetworkError::InvalidUrl(raw.to_string()))?;

    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(NetworkError::InvalidUrl(raw.to_string())),
    }
}

fn header_map(headers: &Headers) -> Result<HeaderMap, NetworkError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| NetworkError::UnknownError(Box::new(err)))?;
        let value =
            HeaderValue::from_str(value).map_err(|err| NetworkError::UnknownError(Box::new(err)))?;
        map.insert(name, value);
    }
    Ok(map)
}
