use crate::article::ExtractionResult;
use scraper::{ElementRef, Html};

const BLOCK_ELEMENTS: [&str; 13] = [
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "td",
    "th",
];

/// Configuration for plain text output
#[derive(Debug, Clone, Default)]
pub struct TextConfig {
    /// Preserve paragraph structure with blank lines
    pub preserve_paragraphs: bool,

    /// Include a title/author header
    pub include_header: bool,
}

/// Convert an extraction result's content to plain text
pub fn convert_to_text(article: &ExtractionResult, config: &TextConfig) -> String {
    let mut output = String::new();

    if config.include_header {
        output.push_str(&generate_header(article));
        output.push('\n');
    }

    let text = if config.preserve_paragraphs {
        extract_text_with_paragraphs(&article.content)
    } else {
        extract_plain_text(&article.content)
    };

    output.push_str(&text);
    output.trim().to_string()
}

fn generate_header(article: &ExtractionResult) -> String {
    let mut header = String::new();

    if !article.title.is_empty() {
        header.push_str(&article.title);
        header.push('\n');
        header.push_str(&"=".repeat(article.title.chars().count()));
        header.push('\n');
    }

    let mut meta_parts = Vec::new();

    if let Some(author) = &article.author {
        meta_parts.push(format!("By: {}", author));
    }

    if let Some(date) = &article.date_published {
        meta_parts.push(format!("Date: {}", date.format("%Y-%m-%d")));
    }

    meta_parts.push(format!("Site: {}", article.domain));

    header.push_str(&meta_parts.join(" | "));
    header.push('\n');
    header
}

/// Strip all tags, keeping text nodes in document order
fn extract_plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect::<String>()
}

/// Extract text with one blank line between block elements
///
/// Innermost block elements each become one paragraph. Loose text between
/// blocks is gathered into paragraphs of its own.
fn extract_text_with_paragraphs(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut blocks: Vec<String> = Vec::new();
    let mut loose = String::new();

    for node in fragment.root_element().descendants() {
        if let Some(element) = ElementRef::wrap(node) {
            if !is_block(&element) {
                continue;
            }
            push_block(&mut blocks, &loose);
            loose.clear();

            if is_leaf_block(&element) {
                push_block(&mut blocks, &element.text().collect::<String>());
            }
        } else if let Some(text) = node.value().as_text() {
            let captured = node.ancestors().filter_map(ElementRef::wrap).any(|a| is_leaf_block(&a));
            if !captured {
                loose.push_str(text);
            }
        }
    }

    push_block(&mut blocks, &loose);
    blocks.join("\n\n")
}

fn push_block(blocks: &mut Vec<String>, text: &str) {
    let text = normalize_whitespace(text);
    if !text.is_empty() {
        blocks.push(text);
    }
}

fn is_block(element: &ElementRef<'_>) -> bool {
    BLOCK_ELEMENTS.contains(&element.value().name())
}

/// A block element with no block elements inside it
fn is_leaf_block(element: &ElementRef<'_>) -> bool {
    is_block(element) && !element.descendants().skip(1).filter_map(ElementRef::wrap).any(|e| is_block(&e))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
