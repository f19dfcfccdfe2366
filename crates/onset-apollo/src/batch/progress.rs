use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Collecting,
    Ready,
    ReadyWithErrors,
    Retrying,
    Exported,
}

impl BatchState {
    /// Collection (or a retry pass) has finished and a snapshot can be taken.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            BatchState::Ready | BatchState::ReadyWithErrors | BatchState::Exported
        )
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchState::Idle => "idle",
            BatchState::Collecting => "collecting",
            BatchState::Ready => "ready",
            BatchState::ReadyWithErrors => "ready with errors",
            BatchState::Retrying => "retrying",
            BatchState::Exported => "exported",
        };
        f.write_str(s)
    }
}

/// Mutable progress of a run: pages done out of pages planned, plus the
/// pages that failed.
///
/// `current` never exceeds `total`. In open-ended runs `total` grows with
/// each page attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    current: u32,
    total: u32,
    failed_pages: BTreeSet<u32>,
}

impl BatchProgress {
    pub(crate) fn planned(total: u32) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Failed pages, ascending.
    #[must_use]
    pub fn failed_pages(&self) -> Vec<u32> {
        self.failed_pages.iter().copied().collect()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_pages.is_empty()
    }

    pub(crate) fn advance(&mut self) {
        self.current = (self.current + 1).min(self.total);
    }

    /// Plans one more page and marks it in progress.
    pub(crate) fn extend_and_advance(&mut self) {
        self.total += 1;
        self.current = self.total;
    }

    /// Restarts the counter for a retry generation over `pages` pages.
    pub(crate) fn restart(&mut self, pages: u32) {
        self.current = 0;
        self.total = pages;
    }

    pub(crate) fn mark_failed(&mut self, page: u32) {
        self.failed_pages.insert(page);
    }

    pub(crate) fn mark_recovered(&mut self, page: u32) {
        self.failed_pages.remove(&page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_never_exceeds_total() {
        let mut progress = BatchProgress::planned(2);
        progress.advance();
        progress.advance();
        progress.advance();
        assert_eq!(progress.current(), 2);
        assert_eq!(progress.total(), 2);
    }

    #[test]
    fn failed_pages_are_unique_and_sorted() {
        let mut progress = BatchProgress::planned(5);
        progress.mark_failed(4);
        progress.mark_failed(2);
        progress.mark_failed(4);
        assert_eq!(progress.failed_pages(), vec![2, 4]);

        progress.mark_recovered(2);
        assert_eq!(progress.failed_pages(), vec![4]);
    }

    #[test]
    fn open_ended_progress_grows_with_each_page() {
        let mut progress = BatchProgress::default();
        progress.extend_and_advance();
        progress.extend_and_advance();
        assert_eq!((progress.current(), progress.total()), (2, 2));
    }

    #[test]
    fn settled_states() {
        assert!(BatchState::Ready.is_settled());
        assert!(BatchState::ReadyWithErrors.is_settled());
        assert!(!BatchState::Collecting.is_settled());
        assert!(!BatchState::Idle.is_settled());
    }
}
