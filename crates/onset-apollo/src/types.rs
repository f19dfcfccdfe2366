//! Response shapes for Apollo's `mixed_companies/search` endpoint.
//!
//! Organizations are kept as loosely typed [`CompanyRecord`]s: Apollo returns
//! address data under many inconsistent field names and the location
//! extractors probe them by name.
//!
//! `organizations` is optional on purpose. A body without it is a malformed
//! page, which the batch collector treats differently from an empty list.

use serde::Deserialize;

use onset_core::{Breadcrumb, CompanyRecord, Pagination};

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organizations: Option<Vec<CompanyRecord>>,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// One page of search results with the organizations list guaranteed present.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub organizations: Vec<CompanyRecord>,
    pub pagination: Pagination,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Error envelope written by the relay itself (not by Apollo).
#[derive(Debug, Deserialize)]
pub(crate) struct RelayErrorBody {
    pub error: String,
}
