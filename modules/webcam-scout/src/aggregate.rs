use std::collections::BTreeMap;

use webcam_common::ResolvedEntry;

/// Resolved streams grouped by category name.
///
/// Categories iterate in lexicographic order. Entries within a category are
/// in insertion order until [`Aggregate::sort`] orders them by lowercase
/// title.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    categories: BTreeMap<String, Vec<ResolvedEntry>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: impl Into<String>, entry: ResolvedEntry) {
        self.categories.entry(category.into()).or_default().push(entry);
    }

    /// Order every category's entries case-insensitively by title. Ties fall
    /// back to the exact title and then the URL so the output does not depend
    /// on the order resolutions finished in.
    pub fn sort(&mut self) {
        for entries in self.categories.values_mut() {
            entries.sort_by_cached_key(|e| (e.title.to_lowercase(), e.title.clone(), e.stream_url.clone()));
        }
    }

    /// Categories and their entries, in publication order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[ResolvedEntry])> {
        self.categories
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Every entry paired with its category, in publication order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ResolvedEntry)> {
        self.categories()
            .flat_map(|(name, entries)| entries.iter().map(move |e| (name, e)))
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
