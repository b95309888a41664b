//! Predicate tree evaluation.
//!
//! A check tree is evaluated top-down against a [`DocumentContext`]. Every
//! node produces a [`CheckResult`]; composite nodes keep their children's
//! results so callers can show per-node diagnostics.

use std::borrow::Cow;

use chrono::Datelike;
use tracing::{debug, trace};

use crate::expression::build_regex;
use crate::models::config::DissectConfig;
use crate::models::document::Document;
use crate::models::pattern::{Check, Region};
use crate::models::results::{CheckResult, RegionResult};
use crate::region::{evaluate_pages, TextExtractor};

/// Everything a check can look at: the document plus per-page region results.
#[derive(Debug, Clone)]
pub struct DocumentContext<'a> {
    document: &'a Document,
    config: &'a DissectConfig,
    regions: Vec<(&'a Region, Vec<RegionResult>)>,
}

impl<'a> DocumentContext<'a> {
    /// Create a context with no precomputed region results.
    pub fn new(document: &'a Document, config: &'a DissectConfig) -> Self {
        Self {
            document,
            config,
            regions: Vec::new(),
        }
    }

    /// Precompute results for `region`. Structurally equal regions are
    /// computed once.
    pub fn with_region(mut self, region: &'a Region) -> Self {
        self.add_region(region);
        self
    }

    /// Precompute results for `region` unless an equal region is already known.
    pub fn add_region(&mut self, region: &'a Region) {
        if self.cached(region).is_none() {
            let results = evaluate_pages(region, self.document, self.config);
            self.regions.push((region, results));
        }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn config(&self) -> &DissectConfig {
        self.config
    }

    /// Get the per-page results of `region`, computing them if not precomputed.
    pub fn region_results(&self, region: &Region) -> Cow<'_, [RegionResult]> {
        match self.cached(region) {
            Some(results) => Cow::Borrowed(results),
            None => Cow::Owned(evaluate_pages(region, self.document, self.config)),
        }
    }

    fn cached(&self, region: &Region) -> Option<&[RegionResult]> {
        self.regions
            .iter()
            .find(|(known, _)| *known == region)
            .map(|(_, results)| results.as_slice())
    }
}

/// Evaluate a check node and all its descendants.
pub fn evaluate(check: &Check, ctx: &DocumentContext<'_>) -> CheckResult {
    let document = ctx.document();

    let result = match check {
        Check::NumPages { num_pages } => CheckResult::from_bool(document.page_count() == *num_pages),

        Check::RegionPredicate(region) => evaluate_region_check(region, ctx),

        Check::Title { regex } => match build_regex(regex, &ctx.config().expression) {
            Ok(re) => CheckResult::from_bool(re.is_match(&document.title)),
            Err(e) => CheckResult::error(e),
        },

        Check::Correspondent { name } => equals(&document.correspondent, name),

        Check::DocumentType { name } => equals(&document.document_type, name),

        Check::StoragePath { name } => equals(&document.storage_path, name),

        Check::Tags { includes, excludes } => CheckResult::from_bool(
            includes.iter().all(|tag| document.has_tag(tag))
                && !excludes.iter().any(|tag| document.has_tag(tag)),
        ),

        Check::DateCreated { before, after, year } => {
            if before.is_none() && after.is_none() && year.is_none() {
                CheckResult::pass()
            } else {
                match document.date_created {
                    Some(created) => CheckResult::from_bool(
                        before.is_none_or(|b| created < b)
                            && after.is_none_or(|a| created > a)
                            && year.is_none_or(|y| created.year() == y),
                    ),
                    None => CheckResult::fail(),
                }
            }
        }

        Check::And { checks } => {
            let children: Vec<CheckResult> = checks.iter().map(|c| evaluate(c, ctx)).collect();
            let passed = children.iter().all(|c| c.passed);
            composite(passed, children)
        }

        Check::Or { checks } => {
            let children: Vec<CheckResult> = checks.iter().map(|c| evaluate(c, ctx)).collect();
            let passed = children.iter().any(|c| c.passed);
            composite(passed, children)
        }

        Check::Not { check: None } => CheckResult::fail(),

        Check::Not { check: Some(child) } => {
            let child = evaluate(child, ctx);
            let result = match child.first_error().map(str::to_string) {
                Some(error) => CheckResult::error(error),
                None => CheckResult::from_bool(!child.passed),
            };
            result.with_children(vec![child])
        }
    };

    trace!("Check {:?} -> passed={}", check_type(check), result.passed);
    result
}

/// Evaluate a list of top-level checks.
pub fn evaluate_all(checks: &[Check], ctx: &DocumentContext<'_>) -> Vec<CheckResult> {
    let results: Vec<CheckResult> = checks.iter().map(|c| evaluate(c, ctx)).collect();
    debug!(
        "Document {}: {} of {} checks passed",
        ctx.document().id,
        results.iter().filter(|r| r.passed).count(),
        results.len()
    );
    results
}

fn evaluate_region_check(region: &Region, ctx: &DocumentContext<'_>) -> CheckResult {
    let results = ctx.region_results(region);
    let extractor = TextExtractor::new(&region.expr.active(), &ctx.config().expression);

    match results.iter().find(|r| r.is_retained) {
        Some(retained) => match &retained.error {
            Some(error) => CheckResult::error(error),
            None => CheckResult::from_bool(retained.has_value(&extractor.group_names())),
        },
        // Nothing retained: still surface a broken expression
        None => {
            let error = match results.first() {
                Some(first) => first.error.clone(),
                None => extractor.error().map(|e| e.to_string()),
            };
            match error {
                Some(error) => CheckResult::error(error),
                None => CheckResult::fail(),
            }
        }
    }
}

fn equals(value: &Option<String>, name: &str) -> CheckResult {
    CheckResult::from_bool(value.as_deref() == Some(name))
}

/// Combine child results; a failed composite carries its first child error.
fn composite(passed: bool, children: Vec<CheckResult>) -> CheckResult {
    let error = if passed {
        None
    } else {
        children.iter().find_map(|c| c.first_error()).map(str::to_string)
    };

    CheckResult {
        passed,
        error,
        children,
    }
}

fn check_type(check: &Check) -> &'static str {
    match check {
        Check::NumPages { .. } => "num_pages",
        Check::RegionPredicate(_) => "region",
        Check::Title { .. } => "title",
        Check::Correspondent { .. } => "correspondent",
        Check::DocumentType { .. } => "document_type",
        Check::StoragePath { .. } => "storage_path",
        Check::Tags { .. } => "tags",
        Check::DateCreated { .. } => "date_created",
        Check::And { .. } => "and",
        Check::Or { .. } => "or",
        Check::Not { .. } => "not",
    }
}
