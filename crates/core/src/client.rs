//! The extraction client.
//!
//! [`ReadabilityClient`] sends one request per call to the Parser endpoint,
//! classifies the response status and decodes successful bodies into
//! [`ExtractionResult`]s. It holds no per-call state, so a single instance can
//! serve concurrent requests.
//!
//! # Example
//!
//! ```rust,no_run
//! use readably_core::ReadabilityClient;
//!
//! # async fn run() -> readably_core::Result<()> {
//! let client = ReadabilityClient::builder("my-token").timeout(10).build()?;
//! let article = client.extract("https://example.com/story").await?;
//! println!("{} ({} words)", article.title, article.word_count);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::article::ExtractionResult;
use crate::classify::{ResponseClass, classify};
use crate::diagnostics::{DiagnosticSink, ResponseDump};
use crate::{ReadabilityError, Result};

/// The Readability Parser API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://readability.com/api/content/v1/parser";

/// Transport settings for the extraction client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Extraction endpoint URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: 30,
            user_agent: format!("readably/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for [`ReadabilityClient`].
///
/// # Example
///
/// ```rust
/// use readably_core::{ReadabilityClient, TracingSink};
///
/// let client = ReadabilityClient::builder("my-token")
///     .endpoint("http://localhost:8080/parser")
///     .timeout(5)
///     .diagnostic_sink(TracingSink)
///     .build()
///     .unwrap();
///
/// assert_eq!(client.endpoint().as_str(), "http://localhost:8080/parser");
/// ```
pub struct ReadabilityClientBuilder {
    token: String,
    config: ClientConfig,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl ReadabilityClientBuilder {
    /// Creates a builder with default settings for the given API token.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), config: ClientConfig::default(), sink: None }
    }

    /// Replaces all transport settings at once.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the extraction endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Sets the sink that receives raw responses of failed requests.
    pub fn diagnostic_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Builds the client. No request is made.
    pub fn build(self) -> Result<ReadabilityClient> {
        let endpoint = Url::parse(&self.config.endpoint)
            .map_err(|e| ReadabilityError::Config(format!("invalid endpoint {}: {e}", self.config.endpoint)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ReadabilityError::Config(e.to_string()))?;

        Ok(ReadabilityClient { http, endpoint, token: self.token, sink: self.sink })
    }
}

/// Client for the article-extraction service.
///
/// Cloning is cheap: clones share the connection pool and diagnostic sink.
#[derive(Clone)]
pub struct ReadabilityClient {
    http: Client,
    endpoint: Url,
    token: String,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl fmt::Debug for ReadabilityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadabilityClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"<redacted>")
            .field("diagnostic_sink", &self.sink.is_some())
            .finish()
    }
}

impl ReadabilityClient {
    /// Creates a client with default settings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder(token).build()
    }

    /// Creates a builder for a client using `token`.
    pub fn builder(token: impl Into<String>) -> ReadabilityClientBuilder {
        ReadabilityClientBuilder::new(token)
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the service to fetch and extract `page_url`.
    ///
    /// The URL is sent as given. A blank URL fails with
    /// [`ReadabilityError::InvalidUrl`] before any request is made.
    pub async fn extract(&self, page_url: &str) -> Result<ExtractionResult> {
        validate_page_url(page_url)?;
        tracing::debug!(page_url, method = "GET", endpoint = %self.endpoint, "requesting extraction");

        let request = self.http.get(self.request_url(page_url));
        self.execute(page_url, request).await
    }

    /// Extracts `page_url` from content the caller already fetched.
    ///
    /// The content is posted as the `content` form field so the service can
    /// skip its own fetch. Empty content behaves exactly like [`extract`].
    ///
    /// [`extract`]: ReadabilityClient::extract
    pub async fn extract_with_content(&self, page_url: &str, content: &str) -> Result<ExtractionResult> {
        if content.is_empty() {
            return self.extract(page_url).await;
        }

        validate_page_url(page_url)?;
        tracing::debug!(
            page_url,
            method = "POST",
            endpoint = %self.endpoint,
            content_len = content.len(),
            "requesting extraction with supplied content"
        );

        let request = self.http.post(self.request_url(page_url)).form(&[("content", content)]);
        self.execute(page_url, request).await
    }

    /// Endpoint URL with the `url` and `token` query parameters appended.
    fn request_url(&self, page_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", page_url)
            .append_pair("token", &self.token);
        url
    }

    async fn execute(&self, page_url: &str, request: RequestBuilder) -> Result<ExtractionResult> {
        let response = request.send().await.map_err(|source| transport(page_url, source))?;

        let status = response.status();
        let headers = self.sink.as_ref().map(|_| response.headers().clone());

        match classify(status.as_u16()) {
            ResponseClass::Success => {
                let body = response.bytes().await.map_err(|source| transport(page_url, source))?;
                let article = decode(page_url, &body).inspect_err(|_| {
                    self.record(page_url, status, headers.as_ref(), &body);
                })?;

                tracing::debug!(
                    page_url,
                    title = %article.title,
                    word_count = article.word_count,
                    rendered_pages = article.rendered_pages,
                    total_pages = article.total_pages,
                    "extraction succeeded"
                );
                Ok(article)
            }
            ResponseClass::Timeout => {
                let body = drain(response, self.sink.is_some()).await;
                self.record(page_url, status, headers.as_ref(), &body);
                tracing::warn!(page_url, "extraction service timed out fetching page");
                Err(ReadabilityError::Timeout { url: page_url.to_string() })
            }
            ResponseClass::Transient => {
                let body = drain(response, self.sink.is_some()).await;
                self.record(page_url, status, headers.as_ref(), &body);
                tracing::warn!(page_url, status = status.as_u16(), "transient extraction service error");
                Err(ReadabilityError::Transient { url: page_url.to_string(), status: status.as_u16() })
            }
            ResponseClass::Terminal => {
                let body = drain(response, true).await;
                self.record(page_url, status, headers.as_ref(), &body);
                tracing::warn!(page_url, status = status.as_u16(), "extraction request rejected");
                Err(ReadabilityError::Http {
                    url: page_url.to_string(),
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                })
            }
        }
    }

    fn record(&self, page_url: &str, status: StatusCode, headers: Option<&HeaderMap>, body: &[u8]) {
        if let (Some(sink), Some(headers)) = (&self.sink, headers) {
            sink.record(&ResponseDump::new(page_url, status, headers, body));
        }
    }
}

fn validate_page_url(page_url: &str) -> Result<()> {
    if page_url.trim().is_empty() {
        return Err(ReadabilityError::InvalidUrl("page URL must not be empty".to_string()));
    }
    Ok(())
}

/// The request URL carries the token, so it is stripped from the source.
fn transport(page_url: &str, source: reqwest::Error) -> ReadabilityError {
    ReadabilityError::Transport { url: page_url.to_string(), source: source.without_url() }
}

/// Reads the rest of the body so the connection goes back to the pool.
///
/// Chunks are only buffered when `keep` is set; otherwise they are dropped as
/// they arrive. A read error ends the drain early with whatever was kept.
async fn drain(mut response: Response, keep: bool) -> Vec<u8> {
    let mut body = Vec::new();
    while let Ok(Some(chunk)) = response.chunk().await {
        if keep {
            body.extend_from_slice(&chunk);
        }
    }
    body
}

fn decode(page_url: &str, body: &[u8]) -> Result<ExtractionResult> {
    serde_json::from_slice(body)
        .map_err(|e| ReadabilityError::Decode { url: page_url.to_string(), message: e.to_string() })
}
