//! The page-fetch seam between the batch collector and the search client.

use async_trait::async_trait;
use thiserror::Error;

use onset_core::SearchFilters;

use crate::client::ApolloClient;
use crate::error::ApolloError;
use crate::types::SearchPage;

/// A failed page fetch, tagged with the page it was for.
#[derive(Debug, Error)]
#[error("page {page}: {source}")]
pub struct FetchError {
    pub page: u32,
    #[source]
    pub source: ApolloError,
}

impl FetchError {
    #[must_use]
    pub fn new(page: u32, source: ApolloError) -> Self {
        Self { page, source }
    }

    /// The upstream answered, but not with a usable organizations list.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.source,
            ApolloError::MissingOrganizations { .. } | ApolloError::Deserialize { .. }
        )
    }

    /// The relay refused the request itself (missing credential, bad
    /// endpoint). Every page would fail the same way, so it is not retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self.source, ApolloError::Relay { .. })
    }
}

/// Fetches one page of search results.
///
/// `page` starts at 1 and `filters.per_page` is the page size. An empty
/// organizations list is a valid answer meaning there is nothing more.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, filters: &SearchFilters, page: u32) -> Result<SearchPage, FetchError>;
}

#[async_trait]
impl PageFetcher for ApolloClient {
    async fn fetch(&self, filters: &SearchFilters, page: u32) -> Result<SearchPage, FetchError> {
        self.search_companies(filters, page)
            .await
            .map_err(|e| FetchError::new(page, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_covers_missing_list_and_bad_json() {
        let missing = FetchError::new(2, ApolloError::MissingOrganizations { page: 2 });
        assert!(missing.is_malformed());

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let bad = FetchError::new(
            2,
            ApolloError::Deserialize {
                context: "test".to_string(),
                source: bad_json,
            },
        );
        assert!(bad.is_malformed());

        let status = FetchError::new(
            2,
            ApolloError::UnexpectedStatus {
                status: 502,
                url: "http://x".to_string(),
            },
        );
        assert!(!status.is_malformed());
        assert!(!status.is_fatal());
        assert_eq!(status.to_string(), "page 2: unexpected HTTP status 502 from http://x");
    }

    #[test]
    fn only_relay_rejections_are_fatal() {
        let relay = FetchError::new(
            1,
            ApolloError::Relay {
                status: 500,
                message: "API key not configured".to_string(),
            },
        );
        assert!(relay.is_fatal());
        assert!(!relay.is_malformed());

        assert!(!FetchError::new(1, ApolloError::RateLimited).is_fatal());
        assert!(!FetchError::new(1, ApolloError::MissingOrganizations { page: 1 }).is_fatal());
    }
}
