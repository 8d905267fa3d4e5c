//! Diagnostic dumps of failed responses.
//!
//! When a request fails at the HTTP level the client can hand the raw
//! response to a [`DiagnosticSink`] for troubleshooting. Dumps never carry the
//! request URL, which embeds the API token.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Cap on the body bytes kept in a dump (64 KiB).
const MAX_DUMP_BODY: usize = 64 * 1024;

/// A raw HTTP response captured for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDump {
    /// The page the extraction was requested for.
    pub page_url: String,
    /// Response status code.
    pub status: u16,
    /// Response headers, in the order received.
    pub headers: Vec<(String, String)>,
    /// Response body, lossily decoded and truncated.
    pub body: String,
}

impl ResponseDump {
    pub(crate) fn new(page_url: &str, status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let truncated = body.len() > MAX_DUMP_BODY;
        let mut text = String::from_utf8_lossy(&body[..body.len().min(MAX_DUMP_BODY)]).into_owned();
        if truncated {
            text.push('…');
        }

        Self { page_url: page_url.to_string(), status: status.as_u16(), headers, body: text }
    }

    fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
    }
}

/// Renders the dump like a raw HTTP/1.1 response.
impl fmt::Display for ResponseDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HTTP/1.1 {} {}", self.status, self.reason())?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;
        write!(f, "{}", self.body)
    }
}

/// Receives raw responses of failed requests.
///
/// Implementations must be safe to call from concurrent requests. Any
/// `Fn(&ResponseDump)` closure is a sink.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, dump: &ResponseDump);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&ResponseDump) + Send + Sync,
{
    fn record(&self, dump: &ResponseDump) {
        self(dump)
    }
}

/// Sink that logs each dump at `warn` under the `readably::dump` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, dump: &ResponseDump) {
        tracing::warn!(
            target: "readably::dump",
            page_url = %dump.page_url,
            status = dump.status,
            "raw extraction response:\n{dump}"
        );
    }
}
