//! Pattern evaluation and batch classification.

use std::sync::Arc;

use tracing::{debug, info};

use crate::checks::{evaluate_all, DocumentContext};
use crate::fields::{build_context, render_field, JinjaRenderer, TemplateRenderer};
use crate::lookup::NameLookup;
use crate::models::config::DissectConfig;
use crate::models::document::Document;
use crate::models::pattern::Pattern;
use crate::models::results::{PatternEvaluationResult, ProcessingResults};

/// Evaluates patterns against documents.
///
/// Evaluation is pure: the same pattern and document always give the same
/// result, and patterns are never modified.
#[derive(Clone)]
pub struct PatternEvaluator {
    config: DissectConfig,
    renderer: Arc<dyn TemplateRenderer>,
    lookup: Option<Arc<dyn NameLookup>>,
}

impl PatternEvaluator {
    /// Create an evaluator with default settings.
    pub fn new() -> Self {
        Self {
            config: DissectConfig::default(),
            renderer: Arc::new(JinjaRenderer::new()),
            lookup: None,
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: DissectConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the template renderer used for fields.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Set the name lookup used for custom field data types.
    pub fn with_lookup(mut self, lookup: Arc<dyn NameLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn config(&self) -> &DissectConfig {
        &self.config
    }

    /// Evaluate a pattern against a document.
    ///
    /// Never fails as a whole: problems are reported on the check, region,
    /// or field they belong to.
    pub fn evaluate_pattern(&self, pattern: &Pattern, document: &Document) -> PatternEvaluationResult {
        let mut ctx = DocumentContext::new(document, &self.config);
        for region in pattern.regions.iter().chain(pattern.check_regions()) {
            ctx.add_region(region);
        }

        let checks = evaluate_all(&pattern.checks, &ctx);

        let regions: Vec<_> = pattern
            .regions
            .iter()
            .map(|region| ctx.region_results(region).into_owned())
            .collect();

        let retained: Vec<_> = regions
            .iter()
            .map(|pages| pages.iter().find(|r| r.is_retained))
            .collect();
        let context = build_context(document, &retained);
        let fields = pattern
            .fields
            .iter()
            .map(|field| {
                render_field(field, &context, self.renderer.as_ref(), self.lookup.as_deref())
            })
            .collect();

        debug!("Evaluated pattern {:?} on document {}", pattern.name, document.id);

        PatternEvaluationResult {
            checks,
            regions,
            fields,
        }
    }

    /// Classify a document against a set of patterns.
    ///
    /// A pattern whose checks report any error is recorded as an error for
    /// this document rather than as a match.
    pub fn classify(&self, patterns: &[Pattern], document: &Document) -> ProcessingResults {
        let mut results = ProcessingResults::new();
        let mut matched = false;

        for pattern in patterns {
            let evaluation = self.evaluate_pattern(pattern, document);
            if let Some(error) = evaluation.first_check_error() {
                results.register_error(document.id, &document.title, &pattern.name, error);
            } else if evaluation.matches() {
                results.register_match(document.id, &pattern.name);
                matched = true;
            }
        }

        if !matched {
            results.register_unmatched(document.id, &document.title);
        }
        results
    }

    /// Check if a document is eligible for batch classification.
    pub fn accepts(&self, document: &Document) -> bool {
        self.config
            .processing
            .required_tags
            .iter()
            .all(|tag| document.has_tag(tag))
    }

    /// Classify every eligible document.
    pub fn classify_all(&self, patterns: &[Pattern], documents: &[Document]) -> ProcessingResults {
        let mut results = ProcessingResults::new();
        let mut skipped = 0;

        for document in documents {
            if self.accepts(document) {
                results.merge(self.classify(patterns, document));
            } else {
                skipped += 1;
            }
        }

        info!(
            "Classified {} documents ({} skipped): {} matched, {} unmatched, {} errors",
            documents.len() - skipped,
            skipped,
            results.matched.len(),
            results.unmatched.len(),
            results.errors.len()
        );
        results
    }
}

impl Default for PatternEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PatternEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternEvaluator")
            .field("config", &self.config)
            .field("lookup", &self.lookup.is_some())
            .finish()
    }
}

/// Evaluate a pattern against a document with default settings.
pub fn evaluate_pattern(pattern: &Pattern, document: &Document) -> PatternEvaluationResult {
    PatternEvaluator::new().evaluate_pattern(pattern, document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{Catalog, Category, NamedElement};
    use crate::models::document::{Page, TextRun};
    use crate::models::pattern::{
        Check, Field, FieldKind, PageSelector, Rectangle, Region, RegionExpression,
    };
    use pretty_assertions::assert_eq;

    const FOOTER: Rectangle = Rectangle {
        x: 0.0,
        y: 700.0,
        x2: 600.0,
        y2: 800.0,
    };

    fn page(footer: &[&str]) -> Page {
        let runs = footer
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let x = 40.0 + 80.0 * i as f64;
                TextRun::new(Rectangle::new(x, 740.0, x + 70.0, 752.0), *word)
            })
            .collect();
        Page::new(600.0, 842.0, runs)
    }

    fn invoice() -> Document {
        Document {
            id: 21,
            title: "ACME 2023-11".to_string(),
            correspondent: Some("ACME".to_string()),
            tags: vec!["inbox".to_string()],
            pages: vec![
                page(&["Total:", "100.00"]),
                page(&["Carried", "over"]),
                page(&["Total:", "1,234.50"]),
            ],
            ..Default::default()
        }
    }

    fn total_region() -> Region {
        Region::new(FOOTER, PageSelector::LastMatch, RegionExpression::simple("Total: <amt:number>"))
    }

    #[test]
    fn test_last_match_end_to_end() {
        let mut pattern = Pattern::new("Invoices");
        pattern.checks = vec![Check::RegionPredicate(total_region())];
        pattern.regions = vec![total_region()];

        let result = evaluate_pattern(&pattern, &invoice());

        assert!(result.checks[0].passed);
        assert!(result.matches());
        assert!(result.regions[0][2].is_retained);
        assert!(!result.regions[0][0].is_retained);
        assert_eq!(
            result.regions[0][2].group_values.as_ref().unwrap()["amt"],
            "1,234.50"
        );
    }

    #[test]
    fn test_results_aligned_with_pattern() {
        let mut pattern = Pattern::new("Aligned");
        pattern.checks = vec![
            Check::NumPages { num_pages: 3 },
            Check::Title {
                regex: "^Other".to_string(),
            },
        ];
        pattern.regions = vec![
            total_region(),
            Region::new(FOOTER, PageSelector::FirstPage, RegionExpression::simple("Carried <w:word>")),
        ];
        pattern.fields = vec![
            Field {
                kind: FieldKind::Custom,
                name: "Total".to_string(),
                template: "{{ amt | parse_monetary }}".to_string(),
            },
            Field {
                kind: FieldKind::Custom,
                name: "Empty".to_string(),
                template: String::new(),
            },
        ];

        let result = evaluate_pattern(&pattern, &invoice());
        assert_eq!(result.checks.len(), 2);
        assert_eq!(result.regions.len(), 2);
        assert!(result.regions.iter().all(|pages| pages.len() == 3));
        assert_eq!(result.fields.len(), 2);

        assert!(!result.matches());
        // FirstPage keeps page 0 even though it did not match
        let second = result.retained()[1].unwrap();
        assert!(second.group_values.is_none());
        assert!(result.regions[1][0].is_retained);
        assert_eq!(result.fields[0].as_ref().unwrap().value.as_deref(), Some("1234.50"));
        assert_eq!(result.fields[1], None);
    }

    #[test]
    fn test_field_data_type_from_lookup() {
        let catalog = Catalog::new().with(
            Category::CustomFields,
            NamedElement::new(1, "Total").with_data_type("monetary"),
        );
        let evaluator = PatternEvaluator::new().with_lookup(Arc::new(catalog));

        let mut pattern = Pattern::new("Typed");
        pattern.regions = vec![total_region()];
        pattern.fields = vec![Field {
            kind: FieldKind::Custom,
            name: "Total".to_string(),
            template: "{{ amt | parse_monetary }}".to_string(),
        }];

        let result = evaluator.evaluate_pattern(&pattern, &invoice());
        let field = result.fields[0].as_ref().unwrap();
        assert_eq!(field.data_type.as_deref(), Some("monetary"));
        assert_eq!(field.error, None);
    }

    #[test]
    fn test_pattern_without_checks_never_matches() {
        let result = evaluate_pattern(&Pattern::new("Empty"), &invoice());
        assert!(result.checks.is_empty());
        assert!(!result.matches());
    }

    #[test]
    fn test_evaluation_does_not_change_pattern() {
        let mut pattern = Pattern::new("Stable");
        pattern.checks = vec![Check::RegionPredicate(total_region())];
        pattern.regions = vec![total_region()];
        let before = pattern.clone();

        let first = evaluate_pattern(&pattern, &invoice());
        let second = evaluate_pattern(&pattern, &invoice());
        assert_eq!(pattern, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify() {
        let mut acme = Pattern::new("ACME");
        acme.checks = vec![Check::Correspondent {
            name: "ACME".to_string(),
        }];

        let mut broken = Pattern::new("Broken");
        broken.checks = vec![Check::not(Check::Title {
            regex: "(".to_string(),
        })];

        let mut other = Pattern::new("Other");
        other.checks = vec![Check::NumPages { num_pages: 1 }];

        let evaluator = PatternEvaluator::new();
        let results = evaluator.classify(&[acme.clone(), broken.clone(), other.clone()], &invoice());
        assert_eq!(results.matched.get(&21), Some(&vec!["ACME".to_string()]));
        assert_eq!(results.errors.len(), 1);
        assert_eq!(results.errors[0].pattern_name, "Broken");
        assert!(results.unmatched.is_empty());

        let results = evaluator.classify(&[other], &invoice());
        assert_eq!(results.unmatched.len(), 1);
        assert_eq!(results.unmatched[0].id, 21);
    }

    #[test]
    fn test_required_tags_filter_batch() {
        let mut acme = Pattern::new("ACME");
        acme.checks = vec![Check::Correspondent {
            name: "ACME".to_string(),
        }];

        let mut untagged = invoice();
        untagged.id = 22;
        untagged.tags.clear();

        let mut config = DissectConfig::default();
        config.processing.required_tags = vec!["inbox".to_string()];
        let evaluator = PatternEvaluator::new().with_config(config);

        assert!(!evaluator.accepts(&untagged));
        let results = evaluator.classify_all(&[acme], &[invoice(), untagged]);
        assert_eq!(results.matched.keys().copied().collect::<Vec<_>>(), vec![21]);
        assert!(results.unmatched.is_empty());
    }
}
