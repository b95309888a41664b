//! Matching an expression against the text of one region on one page.

use tracing::trace;

use crate::error::{EvaluationError, ExpressionError};
use crate::expression::CompiledExpression;
use crate::models::config::ExpressionConfig;
use crate::models::pattern::ExpressionKind;
use crate::models::results::RegionResult;

/// Extracts group values from page text with one compiled expression.
///
/// The expression is compiled once; a compile error is reported on every
/// page the extractor is applied to.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    compiled: Result<CompiledExpression, ExpressionError>,
}

impl TextExtractor {
    /// Compile `expr` for extraction.
    pub fn new(expr: &ExpressionKind, config: &ExpressionConfig) -> Self {
        Self {
            compiled: CompiledExpression::compile(expr, config),
        }
    }

    /// Get the compile error, if the expression is broken.
    pub fn error(&self) -> Option<EvaluationError> {
        self.compiled.as_ref().err().cloned().map(EvaluationError::from)
    }

    /// Get the named groups the expression defines, or none if it is broken.
    pub fn group_names(&self) -> Vec<&str> {
        match &self.compiled {
            Ok(compiled) => compiled.group_names(),
            Err(_) => Vec::new(),
        }
    }

    /// Extract from one page's region text.
    ///
    /// Empty text means there is nothing on the page, and never matches.
    pub fn extract(&self, text: &str) -> RegionResult {
        let compiled = match &self.compiled {
            Ok(compiled) => compiled,
            Err(e) => return RegionResult::failed(text, EvaluationError::from(e.clone())),
        };

        if text.is_empty() {
            return RegionResult::no_match(text);
        }

        match compiled.find(text) {
            Some(found) => {
                trace!("Matched /{}/ with {} groups", compiled.as_str(), found.values.len());
                RegionResult::matched(text, found.values, found.positions)
            }
            None => RegionResult::no_match(text),
        }
    }
}

/// Evaluate `expr` against one block of text with default settings.
pub fn evaluate(expr: &ExpressionKind, text: &str) -> RegionResult {
    evaluate_with_config(expr, text, &ExpressionConfig::default())
}

/// Evaluate `expr` against one block of text.
pub fn evaluate_with_config(
    expr: &ExpressionKind,
    text: &str,
    config: &ExpressionConfig,
) -> RegionResult {
    TextExtractor::new(expr, config).extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn simple(text: &str) -> ExpressionKind {
        ExpressionKind::Simple(text.to_string())
    }

    #[test]
    fn test_match_result() {
        let result = evaluate(&simple("Invoice <n:int>"), "Invoice 42");
        assert!(result.has_match());
        assert_eq!(result.group_values.unwrap()["n"], "42");
        assert_eq!(result.group_positions, Some(vec![[8, 10]]));
        assert_eq!(result.error, None);
        assert!(!result.is_retained);
    }

    #[test]
    fn test_no_match_result() {
        let result = evaluate(&simple("Invoice <n:word>"), "Invoice 42");
        assert_eq!(result, RegionResult::no_match("Invoice 42"));
    }

    #[test]
    fn test_compile_error_result() {
        let result = evaluate(&simple("Total <amt:int"), "Total 5");
        assert_eq!(result.group_values, None);
        assert_eq!(result.error.as_deref(), Some("placeholder not terminated"));
        assert_eq!(result.text, "Total 5");
    }

    #[test]
    fn test_empty_text_never_matches() {
        let result = evaluate(&ExpressionKind::Regex("x*".to_string()), "");
        assert_eq!(result, RegionResult::no_match(""));
        assert!(evaluate(&simple(""), "").group_values.is_none());
    }

    #[test]
    fn test_empty_expression_matches_any_text() {
        let result = evaluate(&simple(""), "anything");
        assert!(result.has_match());
        assert!(result.has_value(&[]));
    }

    #[test]
    fn test_extractor_reports_error() {
        let broken = TextExtractor::new(&ExpressionKind::Regex("(".to_string()), &ExpressionConfig::default());
        assert!(broken.error().is_some());

        let ok = TextExtractor::new(&simple("a"), &ExpressionConfig::default());
        assert!(ok.error().is_none());
    }

    #[test]
    fn test_extractor_group_names() {
        let extractor = TextExtractor::new(&simple("<a:int>-<b:word>"), &ExpressionConfig::default());
        assert_eq!(extractor.group_names(), vec!["a", "b"]);

        let broken = TextExtractor::new(&ExpressionKind::Regex("(".to_string()), &ExpressionConfig::default());
        assert!(broken.group_names().is_empty());
    }
}
