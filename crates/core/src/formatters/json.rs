use crate::article::ExtractionResult;
use crate::{ReadabilityError, Result};

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

/// Serialize an extraction result using the service's own field names
pub fn convert_to_json(article: &ExtractionResult, config: &JsonConfig) -> Result<String> {
    let output = if config.pretty { serde_json::to_string_pretty(article) } else { serde_json::to_string(article) };
    output.map_err(|e| ReadabilityError::Format(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::tests::sample;

    #[test]
    fn test_compact_json() {
        let json = convert_to_json(&sample("<p>x</p>"), &JsonConfig::default()).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#""title":"Sample Article""#));
        assert!(json.contains(r#""author":null"#));
    }

    #[test]
    fn test_pretty_json_decodes_back() {
        let article = sample("<p>x</p>");
        let json = convert_to_json(&article, &JsonConfig { pretty: true }).unwrap();
        assert!(json.contains('\n'));
        assert_eq!(ExtractionResult::from_json(&json).unwrap(), article);
    }
}
