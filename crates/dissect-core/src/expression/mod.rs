//! Expression compilation and matching.

mod matchers;
mod patterns;
mod simple;

pub use matchers::{DecimalSymbol, Matcher};
pub use simple::compile_simple;

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use crate::error::ExpressionError;
use crate::models::config::ExpressionConfig;
use crate::models::pattern::ExpressionKind;

/// Result type for expression operations.
pub type Result<T> = std::result::Result<T, ExpressionError>;

/// Convert a simple expression to regex source.
pub fn simple_expr_to_regex(expr: &str) -> Result<String> {
    compile_simple(expr)
}

/// Build a regex with the fixed matching flags.
///
/// Matching is case-sensitive, `.` also matches newlines, and `^`/`$`
/// anchor the whole text. Every regex the engine runs, including title
/// checks, is built here.
pub fn build_regex(pattern: &str, config: &ExpressionConfig) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(false)
        .multi_line(false)
        .dot_matches_new_line(true)
        .size_limit(config.size_limit)
        .build()
        .map_err(|e| ExpressionError::InvalidRegex(e.to_string()))
}

/// Named group values of one match, with their character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupMatch {
    pub values: BTreeMap<String, String>,
    pub positions: Vec<[usize; 2]>,
}

/// An expression compiled to a ready-to-run regex.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    regex: Regex,
    source: ExpressionKind,
}

impl CompiledExpression {
    /// Compile an expression with the flags of [`build_regex`].
    pub fn compile(expr: &ExpressionKind, config: &ExpressionConfig) -> Result<Self> {
        let pattern = match expr {
            ExpressionKind::Simple(text) => compile_simple(text)?,
            ExpressionKind::Regex(text) => text.clone(),
        };

        let regex = build_regex(&pattern, config)?;

        trace!("Compiled {:?} to /{}/", expr, regex.as_str());

        Ok(Self {
            regex,
            source: expr.clone(),
        })
    }

    /// Get the compiled regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Get the expression this was compiled from.
    pub fn source(&self) -> &ExpressionKind {
        &self.source
    }

    /// Get the named groups, in the order they appear in the expression.
    pub fn group_names(&self) -> Vec<&str> {
        self.regex.capture_names().flatten().collect()
    }

    /// Find the first match in `text`.
    ///
    /// Only the leftmost match is considered. Groups that did not take part in
    /// the match are left out.
    pub fn find(&self, text: &str) -> Option<GroupMatch> {
        let caps = self.regex.captures(text)?;

        let mut found = GroupMatch::default();
        for (index, name) in self.regex.capture_names().enumerate() {
            let (Some(name), Some(group)) = (name, caps.get(index)) else {
                continue;
            };
            found.values.insert(name.to_string(), group.as_str().to_string());
            found.positions.push([
                char_offset(text, group.start()),
                char_offset(text, group.end()),
            ]);
        }

        Some(found)
    }
}

/// Convert a byte offset into a character offset.
fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile(expr: ExpressionKind) -> CompiledExpression {
        CompiledExpression::compile(&expr, &ExpressionConfig::default()).unwrap()
    }

    fn simple(text: &str) -> CompiledExpression {
        compile(ExpressionKind::Simple(text.to_string()))
    }

    #[test]
    fn test_word_does_not_match_digits() {
        assert!(simple("Invoice <n:word>").find("Invoice 42").is_none());
    }

    #[test]
    fn test_int_match_offsets() {
        let found = simple("Invoice <n:int>").find("Invoice 42").unwrap();
        assert_eq!(found.values["n"], "42");
        assert_eq!(found.positions, vec![[8, 10]]);
    }

    #[test]
    fn test_reflowed_whitespace() {
        let expr = simple("Invoice <n:int>");
        for text in ["Invoice   42", "Invoice\n42", "Invoice \t 42"] {
            let found = expr.find(text).unwrap();
            assert_eq!(found.values["n"], "42", "text: {:?}", text);
        }
    }

    #[test]
    fn test_number_comma_locale() {
        let found = simple("<x:number:comma>").find("1.234,56").unwrap();
        assert_eq!(found.values["x"], "1.234,56");
    }

    #[test]
    fn test_number_dot_locale_on_comma_text() {
        let found = simple("<x:number>").find("1.234,56").unwrap();
        assert_eq!(found.values["x"], "1.234");
    }

    #[test]
    fn test_number_dot_locale() {
        let found = simple("Total: <amt:number>").find("Total: 1,234.50").unwrap();
        assert_eq!(found.values["amt"], "1,234.50");
    }

    #[test]
    fn test_word_matches_unicode_letters() {
        let found = simple("Name: <n:word>").find("Name: Łukasz").unwrap();
        assert_eq!(found.values["n"], "Łukasz");
        assert_eq!(found.positions, vec![[6, 12]]);
    }

    #[test]
    fn test_char_offsets_after_multibyte_text() {
        let found = simple("<n:int>").find("Größe 12").unwrap();
        assert_eq!(found.positions, vec![[6, 8]]);
    }

    #[test]
    fn test_wildcard_crosses_lines() {
        let found = simple("From*<n:int>").find("From\nline two 7").unwrap();
        assert_eq!(found.values["n"], "7");
    }

    #[test]
    fn test_raw_regex_groups_in_order() {
        let expr = compile(ExpressionKind::Regex(r"(?P<b>\d+)-(?P<a>\d+)".to_string()));
        assert_eq!(expr.group_names(), vec!["b", "a"]);

        let found = expr.find("x 12-34").unwrap();
        assert_eq!(found.values["a"], "34");
        assert_eq!(found.positions, vec![[2, 4], [5, 7]]);
    }

    #[test]
    fn test_optional_group_left_out() {
        let expr = compile(ExpressionKind::Regex(r"(?P<a>x)?(?P<b>y)".to_string()));
        let found = expr.find("y").unwrap();
        assert!(!found.values.contains_key("a"));
        assert_eq!(found.positions, vec![[0, 1]]);
    }

    #[test]
    fn test_case_sensitive() {
        assert!(simple("total").find("TOTAL").is_none());
    }

    #[test]
    fn test_invalid_regex() {
        let err = CompiledExpression::compile(
            &ExpressionKind::Regex("(unclosed".to_string()),
            &ExpressionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidRegex(_)));
    }

    #[test]
    fn test_build_regex_flags() {
        let config = ExpressionConfig::default();
        assert!(!build_regex("total", &config).unwrap().is_match("TOTAL"));
        assert!(build_regex("a.b", &config).unwrap().is_match("a\nb"));
        assert!(!build_regex("^b", &config).unwrap().is_match("a\nb"));
    }

    #[test]
    fn test_simple_expr_to_regex() {
        assert_eq!(simple_expr_to_regex("<n:int>").unwrap(), r"(?P<n>[0-9]+)");
    }
}
