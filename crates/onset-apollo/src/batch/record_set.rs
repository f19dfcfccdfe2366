use std::collections::{BTreeMap, HashSet};

use onset_core::CompanyRecord;

/// Accumulated records of a run, with the page each one came from.
///
/// The page tags live in a side table aligned by index with `records`, so the
/// records themselves never carry bookkeeping fields into an export. Ids are
/// not used as keys because the upstream can repeat a company across pages.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<CompanyRecord>,
    source_pages: Vec<u32>,
}

impl RecordSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub(crate) fn push_page(&mut self, page: u32, records: Vec<CompanyRecord>) {
        self.source_pages
            .extend(std::iter::repeat_n(page, records.len()));
        self.records.extend(records);
    }

    /// Drops every record that came from `page`.
    pub(crate) fn remove_page(&mut self, page: u32) {
        let mut tags = self.source_pages.iter();
        self.records
            .retain(|_| tags.next().is_some_and(|&tag| tag != page));
        self.source_pages.retain(|&tag| tag != page);
    }

    #[must_use]
    pub fn count_for_page(&self, page: u32) -> usize {
        self.source_pages.iter().filter(|&&tag| tag == page).count()
    }

    /// Record counts per source page, ascending by page.
    #[must_use]
    pub fn page_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for &page in &self.source_pages {
            *counts.entry(page).or_insert(0) += 1;
        }
        counts
    }

    /// True when some record lacks an id or shares it with another record.
    #[must_use]
    pub fn has_duplicate_or_missing_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.records.len());
        self.records
            .iter()
            .any(|record| record.id().is_none_or(|id| !seen.insert(id)))
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.source_pages.clear();
    }

    pub(crate) fn into_records(self) -> Vec<CompanyRecord> {
        self.records
    }
}
