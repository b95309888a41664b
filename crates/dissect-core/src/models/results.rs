//! Evaluation results returned to the editor and to batch callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Extraction result of one region on one page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionResult {
    /// Text found inside the region on this page.
    pub text: String,

    /// Named group values, or `None` when the expression did not match.
    pub group_values: Option<BTreeMap<String, String>>,

    /// `[start, end)` character offsets of each participating named group,
    /// in the order the groups appear in the expression.
    pub group_positions: Option<Vec<[usize; 2]>>,

    /// Compilation error, if the expression is broken.
    pub error: Option<String>,

    /// Whether this page's values are the region's retained values.
    #[serde(default)]
    pub is_retained: bool,
}

impl RegionResult {
    /// Result for a page where the expression found nothing.
    pub fn no_match(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Result for a page that could not be evaluated.
    pub fn failed(text: impl Into<String>, error: impl ToString) -> Self {
        Self {
            text: text.into(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    /// Result for a page where the expression matched.
    pub fn matched(
        text: impl Into<String>,
        group_values: BTreeMap<String, String>,
        group_positions: Vec<[usize; 2]>,
    ) -> Self {
        Self {
            text: text.into(),
            group_values: Some(group_values),
            group_positions: Some(group_positions),
            error: None,
            is_retained: false,
        }
    }

    /// Check if the expression matched on this page.
    pub fn has_match(&self) -> bool {
        self.group_values.is_some()
    }

    /// Check if this page holds a usable value: a match where, if the
    /// expression defines named groups, at least one of them captured text.
    ///
    /// `group_names` are the groups the expression defines. Groups that did
    /// not take part in the match are missing from `group_values` and count
    /// as empty.
    pub fn has_value(&self, group_names: &[&str]) -> bool {
        match &self.group_values {
            Some(_) if group_names.is_empty() => true,
            Some(values) => group_names
                .iter()
                .any(|name| values.get(*name).is_some_and(|v| !v.is_empty())),
            None => false,
        }
    }
}

/// Outcome of one check node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,

    pub error: Option<String>,

    /// Results of the node's children, aligned by index (composite checks only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CheckResult>,
}

impl CheckResult {
    pub fn pass() -> Self {
        Self::from_bool(true)
    }

    pub fn fail() -> Self {
        Self::from_bool(false)
    }

    pub fn from_bool(passed: bool) -> Self {
        Self {
            passed,
            error: None,
            children: Vec::new(),
        }
    }

    /// A failed check carrying an error message.
    pub fn error(message: impl ToString) -> Self {
        Self {
            passed: false,
            error: Some(message.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<CheckResult>) -> Self {
        self.children = children;
        self
    }

    /// Get the first error in this subtree, in pre-order.
    pub fn first_error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or_else(|| self.children.iter().find_map(|c| c.first_error()))
    }
}

/// Rendered value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldResult {
    #[serde(default)]
    pub data_type: Option<String>,

    pub value: Option<String>,

    pub error: Option<String>,
}

/// Complete evaluation of one pattern against one document.
///
/// Every list is aligned by index with the corresponding pattern list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatternEvaluationResult {
    pub checks: Vec<CheckResult>,

    /// One inner list per region, one entry per page.
    pub regions: Vec<Vec<RegionResult>>,

    pub fields: Vec<Option<FieldResult>>,
}

impl PatternEvaluationResult {
    /// Check if the document matches: at least one check, all of them passed.
    pub fn matches(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    /// Get the first check error, if any check in the tree reported one.
    pub fn first_check_error(&self) -> Option<&str> {
        self.checks.iter().find_map(|c| c.first_error())
    }

    /// Get the retained result of each region.
    pub fn retained(&self) -> Vec<Option<&RegionResult>> {
        self.regions
            .iter()
            .map(|pages| pages.iter().find(|r| r.is_retained))
            .collect()
    }
}

/// Identifies a document in batch results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub id: u64,
    pub title: String,
}

/// A pattern that could not be evaluated cleanly on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingError {
    pub document: ProcessedDocument,
    pub pattern_name: String,
    pub error: String,
}

/// Outcome of classifying a set of documents against a set of patterns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingResults {
    pub errors: Vec<ProcessingError>,

    /// Matching pattern names per document id.
    pub matched: BTreeMap<u64, Vec<String>>,

    pub unmatched: Vec<ProcessedDocument>,
}

impl ProcessingResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_error(
        &mut self,
        document_id: u64,
        document_title: &str,
        pattern_name: &str,
        error: impl Into<String>,
    ) {
        self.errors.push(ProcessingError {
            document: ProcessedDocument {
                id: document_id,
                title: document_title.to_string(),
            },
            pattern_name: pattern_name.to_string(),
            error: error.into(),
        });
    }

    pub fn register_match(&mut self, document_id: u64, pattern_name: &str) {
        self.matched
            .entry(document_id)
            .or_default()
            .push(pattern_name.to_string());
    }

    pub fn register_unmatched(&mut self, document_id: u64, document_title: &str) {
        self.unmatched.push(ProcessedDocument {
            id: document_id,
            title: document_title.to_string(),
        });
    }

    /// Fold another result set into this one.
    pub fn merge(&mut self, other: ProcessingResults) {
        self.errors.extend(other.errors);
        for (id, names) in other.matched {
            self.matched.entry(id).or_default().extend(names);
        }
        self.unmatched.extend(other.unmatched);
    }

    /// Get ids of documents matched by more than one pattern.
    pub fn multi_matched(&self) -> Vec<u64> {
        self.matched
            .iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_has_value() {
        assert!(!RegionResult::no_match("text").has_value(&[]));

        let no_groups = RegionResult::matched("Invoice", BTreeMap::new(), vec![]);
        assert!(no_groups.has_value(&[]));

        let mut values = BTreeMap::new();
        values.insert("a".to_string(), String::new());
        let blank = RegionResult::matched("", values.clone(), vec![[0, 0]]);
        assert!(!blank.has_value(&["a"]));

        values.insert("b".to_string(), "x".to_string());
        let partial = RegionResult::matched("x", values, vec![[0, 0], [0, 1]]);
        assert!(partial.has_value(&["a", "b"]));
    }

    #[test]
    fn test_has_value_with_groups_left_out() {
        // The expression defines a group, but it did not take part in the match
        let left_out = RegionResult::matched("Total", BTreeMap::new(), vec![]);
        assert!(!left_out.has_value(&["amt"]));
    }

    #[test]
    fn test_leaf_check_result_omits_children() {
        let json = serde_json::to_string(&CheckResult::pass()).unwrap();
        assert_eq!(json, r#"{"passed":true,"error":null}"#);
    }

    #[test]
    fn test_first_error_is_pre_order() {
        let result = CheckResult::fail().with_children(vec![
            CheckResult::pass(),
            CheckResult::fail().with_children(vec![CheckResult::error("first")]),
            CheckResult::error("second"),
        ]);
        assert_eq!(result.first_error(), Some("first"));
    }

    #[test]
    fn test_matches_requires_checks() {
        let empty = PatternEvaluationResult::default();
        assert!(!empty.matches());

        let passing = PatternEvaluationResult {
            checks: vec![CheckResult::pass(), CheckResult::pass()],
            ..Default::default()
        };
        assert!(passing.matches());
    }

    #[test]
    fn test_processing_results() {
        let mut results = ProcessingResults::new();
        results.register_match(1, "Invoices");
        results.register_match(1, "Receipts");
        results.register_match(2, "Invoices");
        results.register_unmatched(3, "Letter");
        results.register_error(4, "Scan", "Invoices", "invalid regex");

        assert_eq!(results.multi_matched(), vec![1]);

        let json = serde_json::to_string(&results).unwrap();
        let parsed: ProcessingResults = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, results);
    }
}
