//! Status-code classification for extraction responses.
//!
//! The mapping is independent of the transport so it can be tested without a
//! live network.

/// What the client does with a response, decided by its status code alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 200: decode the body as an extraction result.
    Success,
    /// 504: the service gave up fetching the page.
    Timeout,
    /// Any other 5xx: drain the body and report a retryable failure.
    Transient,
    /// Anything else: keep the body for diagnostics and fail.
    Terminal,
}

impl ResponseClass {
    /// Whether a caller's retry policy should try the same request again.
    pub fn is_retryable(self) -> bool {
        matches!(self, ResponseClass::Transient)
    }
}

/// Maps an HTTP status code to the outcome the client reports.
///
/// Only an exact 200 counts as success; the service never answers with other
/// 2xx codes, so one would be unexpected and is treated as terminal.
pub fn classify(status: u16) -> ResponseClass {
    match status {
        200 => ResponseClass::Success,
        504 => ResponseClass::Timeout,
        s if s >= 500 => ResponseClass::Transient,
        _ => ResponseClass::Terminal,
    }
}
