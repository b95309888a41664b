//! Region evaluation: layout, extraction, and page selection.

mod extractor;
mod layout;
mod selector;

pub use extractor::{evaluate, evaluate_with_config, TextExtractor};
pub use layout::region_text;
pub use selector::{resolve, retain};

use tracing::debug;

use crate::models::config::DissectConfig;
use crate::models::document::Document;
use crate::models::pattern::Region;
use crate::models::results::RegionResult;

/// Evaluate a region's active expression against already extracted text.
///
/// Used for live preview of a single page; no page selection is applied.
pub fn evaluate_region(region: &Region, page_text: &str) -> RegionResult {
    evaluate(&region.expr.active(), page_text)
}

/// Evaluate a region on every page of a document and mark the retained page.
///
/// Returns one result per page.
pub fn evaluate_pages(region: &Region, document: &Document, config: &DissectConfig) -> Vec<RegionResult> {
    let extractor = TextExtractor::new(&region.expr.active(), &config.expression);

    let mut results: Vec<RegionResult> = document
        .pages
        .iter()
        .map(|page| extractor.extract(&page.region_text(&region.rect, &config.layout)))
        .collect();

    let retained = retain(&mut results, region.page);
    debug!(
        "Region {:?} on document {}: {} of {} pages matched, retained {:?}",
        region.expr.active().source(),
        document.id,
        results.iter().filter(|r| r.has_match()).count(),
        results.len(),
        retained
    );

    results
}
