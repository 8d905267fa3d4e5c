//! The decoded extraction result.
//!
//! This module defines [`ExtractionResult`], the record the extraction service
//! returns for a page: title, author, rendered HTML body and pagination state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::formatters::{self, OutputFormat};
use crate::{ReadabilityError, Result};

/// An article as extracted by the service.
///
/// Fields the service may not know (`author`, `date_published`,
/// `next_page_id`) are `Option`s: `None` means "unknown", which is distinct
/// from an empty string.
///
/// # Example
///
/// ```rust
/// use readably_core::ExtractionResult;
///
/// let json = r#"{
///     "domain": "example.com",
///     "author": null,
///     "url": "https://example.com/story",
///     "short_url": "https://rdd.me/abc",
///     "title": "A Story",
///     "total_pages": 1,
///     "word_count": 2,
///     "content": "<p>Hello world</p>",
///     "date_published": null,
///     "next_page_id": null,
///     "rendered_pages": 1
/// }"#;
///
/// let article = ExtractionResult::from_json(json).unwrap();
/// assert_eq!(article.title, "A Story");
/// assert!(article.author.is_none());
/// assert!(article.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Site domain of the source page.
    pub domain: String,

    /// Article author, when the service could identify one.
    #[serde(default)]
    pub author: Option<String>,

    /// Canonical resolved URL of the page.
    pub url: Url,

    /// Short-link form of the page URL.
    #[serde(alias = "shortURL", alias = "shortUrl")]
    pub short_url: Url,

    /// Extracted article title.
    pub title: String,

    /// Total pages in a multi-page article.
    #[serde(alias = "totalPages")]
    pub total_pages: u32,

    /// Word count of the extracted content.
    #[serde(alias = "wordCount")]
    pub word_count: u64,

    /// Extracted HTML body, covering the pages rendered so far.
    pub content: String,

    /// Publication timestamp, when known.
    #[serde(default, alias = "datePublished", deserialize_with = "deserialize_published")]
    pub date_published: Option<DateTime<Utc>>,

    /// Identifier for the next page, present while more pages remain.
    #[serde(default, alias = "nextPageId")]
    pub next_page_id: Option<String>,

    /// Number of pages already rendered into `content`.
    #[serde(alias = "renderedPages")]
    pub rendered_pages: u32,
}

impl ExtractionResult {
    /// Decodes a result from a JSON string.
    ///
    /// The client decodes response bodies itself; this is for results that
    /// were stored or piped elsewhere.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ReadabilityError::Decode { url: String::from("<json>"), message: e.to_string() })
    }

    /// True when the service reported a further page to request.
    pub fn has_more_pages(&self) -> bool {
        self.next_page_id.is_some()
    }

    /// True when `content` covers the whole article.
    pub fn is_complete(&self) -> bool {
        !self.has_more_pages()
    }

    /// Estimated reading time in minutes (200 words per minute).
    pub fn reading_time(&self) -> f64 {
        self.word_count as f64 / 200.0
    }

    /// Converts content to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        formatters::render(self, format, &Default::default())
    }

    /// Gets the result as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ReadabilityError::Format(e.to_string()))
    }
}

/// Accepts `null`, RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date.
///
/// Naive forms are taken as UTC. An empty string is treated like `null`.
fn deserialize_published<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_published(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognized date_published format: {value}"))),
    }
}

pub(crate) fn parse_published(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
