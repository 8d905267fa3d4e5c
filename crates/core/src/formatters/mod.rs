//! Rendering of extraction results for display.

pub mod json;
pub mod markdown;
pub mod text;

use std::str::FromStr;

pub use json::{JsonConfig, convert_to_json};
pub use markdown::{LinkReference, MarkdownConfig, convert_to_markdown, extract_links};
pub use text::{TextConfig, convert_to_text};

use crate::Result;
use crate::article::ExtractionResult;

/// Output format options for an extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The result record as JSON.
    Json,
    /// The extracted HTML content, unchanged.
    Html,
    /// Content converted to Markdown.
    Markdown,
    /// Content with all tags stripped.
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, html, markdown, text", s)),
        }
    }
}

/// Per-format settings used by [`render`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub json: JsonConfig,
    pub markdown: MarkdownConfig,
    pub text: TextConfig,
}

/// Renders `article` in `format`.
pub fn render(article: &ExtractionResult, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Json => convert_to_json(article, &options.json),
        OutputFormat::Html => Ok(article.content.clone()),
        OutputFormat::Markdown => convert_to_markdown(article, &options.markdown),
        OutputFormat::Text => Ok(convert_to_text(article, &options.text)),
    }
}
