//! Pure pieces of workout setup: resolving a template or category name to an
//! ordered exercise list. The network-backed first tier (the user's most
//! recent session with the same name) lives in the service layer; these
//! helpers are its fallbacks and are independently testable.

use crate::models::{Exercise, Template};

/// Catalog projection: every exercise whose `category` or `category_type`
/// matches the target name, in catalog order. This is the second-tier
/// fallback when no prior session carries the target name.
#[must_use]
pub fn category_fallback(catalog: &[Exercise], target: &str) -> Vec<String> {
    catalog
        .iter()
        .filter(|e| e.category == target || e.category_type.to_string() == target)
        .map(|e| e.name.clone())
        .collect()
}

/// Maps a stored template to exercise names via the catalog, ordered by
/// `sort_order`. Ids that no longer resolve are skipped.
#[must_use]
pub fn template_exercise_names(template: &Template, catalog: &[Exercise]) -> Vec<String> {
    let mut entries = template.template_exercises.clone();
    entries.sort_by_key(|te| te.sort_order);
    entries
        .iter()
        .filter_map(|te| {
            catalog
                .iter()
                .find(|e| e.id == te.exercise_id)
                .map(|e| e.name.clone())
        })
        .collect()
}

/// Drops duplicate names while preserving first-appearance order. The backend
/// already deduplicates its latest-session response; this keeps the invariant
/// local.
#[must_use]
pub fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
