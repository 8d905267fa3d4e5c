//! Client for the Readability Parser article-extraction API.
//!
//! Hand the client a page URL (and optionally HTML you already fetched) and it
//! returns the article the service extracted: title, author, cleaned-up HTML
//! body and pagination state.

pub mod article;
pub mod classify;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod formatters;

pub use article::ExtractionResult;
pub use classify::{ResponseClass, classify};
pub use client::{ClientConfig, DEFAULT_ENDPOINT, ReadabilityClient, ReadabilityClientBuilder};
pub use diagnostics::{DiagnosticSink, ResponseDump, TracingSink};
pub use error::{ReadabilityError, Result};
pub use formatters::{
    JsonConfig, MarkdownConfig, OutputFormat, RenderOptions, TextConfig, convert_to_json, convert_to_markdown,
    convert_to_text, render,
};
