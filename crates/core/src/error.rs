//! Error types for extraction requests.
//!
//! [`ReadabilityError`] covers every way a call to the extraction service can
//! fail: the request never completing, the service answering with a non-200
//! status, or a 200 body that does not decode.
//!
//! # Example
//!
//! ```rust,no_run
//! use readably_core::{ReadabilityClient, ReadabilityError};
//!
//! # async fn run() -> readably_core::Result<()> {
//! let client = ReadabilityClient::new("my-token")?;
//! match client.extract("https://example.com/story").await {
//!     Ok(article) => println!("{}", article.title),
//!     Err(e) if e.is_transient() => println!("service hiccup, try again: {e}"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Main error type for extraction operations.
#[derive(Error, Debug)]
pub enum ReadabilityError {
    /// The request could not be sent or the response could not be read.
    ///
    /// Wraps DNS failures, refused connections, transport timeouts and
    /// truncated bodies reported by reqwest.
    #[error("HTTP request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered 504: its own fetch of the page timed out.
    #[error("Extraction service timed out fetching {url}")]
    Timeout { url: String },

    /// Any 5xx other than 504. Retrying later may succeed.
    #[error("Transient extraction service error ({status}) for {url}, maybe try again")]
    Transient { url: String, status: u16 },

    /// Any other non-200 status.
    ///
    /// `body` holds whatever the service sent back, which usually names the
    /// rejected parameter or the authentication problem.
    #[error("Extraction service returned HTTP {status} for {url}: {body}")]
    Http { url: String, status: u16, body: String },

    /// A 200 response whose body is not the expected JSON document.
    #[error("Failed to decode extraction result for {url}: {message}")]
    Decode { url: String, message: String },

    /// The page URL handed to the client was empty.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The client could not be constructed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An extraction result could not be rendered in the requested format.
    #[error("Failed to format output: {0}")]
    Format(String),
}

impl ReadabilityError {
    /// Returns true for the errors a caller may reasonably retry.
    ///
    /// Only the transient 5xx class qualifies; a 504 means the service could
    /// not reach the page, which an immediate retry rarely fixes.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReadabilityError::Transient { .. })
    }

    /// The HTTP status the service answered with, when the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ReadabilityError::Timeout { .. } => Some(504),
            ReadabilityError::Transient { status, .. } | ReadabilityError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The page URL the failed request was about, if any.
    pub fn page_url(&self) -> Option<&str> {
        match self {
            ReadabilityError::Transport { url, .. }
            | ReadabilityError::Timeout { url }
            | ReadabilityError::Transient { url, .. }
            | ReadabilityError::Http { url, .. }
            | ReadabilityError::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Result type alias for ReadabilityError.
pub type Result<T> = std::result::Result<T, ReadabilityError>;
