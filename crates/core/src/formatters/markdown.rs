use crate::article::ExtractionResult;
use crate::{ReadabilityError, Result};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Configuration for Markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownConfig {
    /// Include TOML frontmatter with the result's metadata
    pub include_frontmatter: bool,
    /// Generate reference table for all links
    pub include_references: bool,
    /// Include title as H1 heading at the start of content
    pub include_title_heading: bool,
}

/// A collected link reference
#[derive(Debug, Clone)]
pub struct LinkReference {
    /// The link text
    pub text: String,
    /// The link URL
    pub url: String,
}

/// Convert an extraction result's content to Markdown
pub fn convert_to_markdown(article: &ExtractionResult, config: &MarkdownConfig) -> Result<String> {
    let mut output = String::new();

    if config.include_frontmatter {
        output.push_str(&generate_frontmatter(article));
        output.push('\n');
    }

    if config.include_title_heading && !article.title.is_empty() {
        output.push_str(&format!("# {}\n\n", article.title));
    }

    output.push_str(&html_to_markdown(&article.content));

    if config.include_references {
        let links = extract_links(&article.content)?;
        if !links.is_empty() {
            output.push_str("\n\n## References\n\n");
            output.push_str(&generate_reference_table(&links));
        }
    }

    Ok(output)
}

/// Generate TOML frontmatter from the result's metadata
fn generate_frontmatter(article: &ExtractionResult) -> String {
    let mut frontmatter = String::from("+++");

    frontmatter.push_str(&format!("\ntitle = {}", toml_escape_string(&article.title)));

    if let Some(author) = &article.author {
        frontmatter.push_str(&format!("\nauthor = {}", toml_escape_string(author)));
    }

    if let Some(date) = &article.date_published {
        frontmatter.push_str(&format!("\ndate = {}", date.to_rfc3339()));
    }

    frontmatter.push_str(&format!("\ndomain = {}", toml_escape_string(&article.domain)));
    frontmatter.push_str(&format!("\nurl = {}", toml_escape_string(article.url.as_str())));
    frontmatter.push_str(&format!("\nshort_url = {}", toml_escape_string(article.short_url.as_str())));
    frontmatter.push_str(&format!("\nword_count = {}", article.word_count));
    frontmatter.push_str(&format!("\nrendered_pages = {}", article.rendered_pages));
    frontmatter.push_str(&format!("\ntotal_pages = {}", article.total_pages));

    if let Some(next) = &article.next_page_id {
        frontmatter.push_str(&format!("\nnext_page_id = {}", toml_escape_string(next)));
    }

    frontmatter.push_str("\n+++\n");
    frontmatter
}

/// Escape a string for TOML format
fn toml_escape_string(s: &str) -> String {
    format!(
        "\"{}\"",
        s.replace('\\', "\\\\").replace('\"', "\\\"").replace('\n', "\\n")
    )
}

/// Convert HTML to Markdown using htmd crate
#[cfg(feature = "markdown")]
fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_default()
}

/// Fallback HTML to text conversion when markdown feature is disabled
#[cfg(not(feature = "markdown"))]
fn html_to_markdown(html: &str) -> String {
    let doc = Html::parse_fragment(html);
    doc.root_element().text().collect::<String>()
}

/// Extract all links from HTML content, first occurrence of each URL wins
pub fn extract_links(html: &str) -> Result<Vec<LinkReference>> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse("a[href]").map_err(|e| ReadabilityError::Format(e.to_string()))?;
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for element in document.select(&selector) {
        let text = element.text().collect::<String>().trim().to_string();
        let Some(url) = element.value().attr("href") else { continue };

        if text.is_empty() || url.is_empty() {
            continue;
        }

        if seen.insert(url.to_string()) {
            links.push(LinkReference { text, url: url.to_string() });
        }
    }

    Ok(links)
}

/// Generate a reference table from collected links
fn generate_reference_table(links: &[LinkReference]) -> String {
    let mut table = String::from("| # | Text | URL |\n");
    table.push_str("|---|------|-----|\n");

    for (i, link) in links.iter().enumerate() {
        table.push_str(&format!("| {} | {} | {} |\n", i + 1, escape_pipe(&link.text), escape_pipe(&link.url)));
    }

    table
}

/// Escape pipe characters for Markdown tables
fn escape_pipe(s: &str) -> String {
    s.replace('|', "\\|")
}
