//! Page selection: which page's result a region keeps.

use crate::models::pattern::PageSelector;
use crate::models::results::RegionResult;

/// Get the index of the result `selector` picks, if any.
///
/// Exact indexes past the end resolve to nothing; they are not clamped.
pub fn resolve(results: &[RegionResult], selector: PageSelector) -> Option<usize> {
    match selector {
        PageSelector::ExactPage(index) => (index < results.len()).then_some(index),
        PageSelector::FirstPage => resolve(results, PageSelector::ExactPage(0)),
        PageSelector::LastPage => results
            .len()
            .checked_sub(1)
            .and_then(|last| resolve(results, PageSelector::ExactPage(last))),
        PageSelector::FirstMatch => results.iter().position(RegionResult::has_match),
        PageSelector::LastMatch => results.iter().rposition(RegionResult::has_match),
    }
}

/// Mark the result `selector` picks as retained and clear all other marks.
///
/// Returns the retained index. Applying it twice gives the same marks.
pub fn retain(results: &mut [RegionResult], selector: PageSelector) -> Option<usize> {
    let retained = resolve(results, selector);
    for (index, result) in results.iter_mut().enumerate() {
        result.is_retained = Some(index) == retained;
    }
    retained
}
