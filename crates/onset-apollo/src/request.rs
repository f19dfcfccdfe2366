//! Request body for `mixed_companies/search`.

use serde::Serialize;

use onset_core::{EmployeeRange, SearchFilters};

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_organization_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub organization_locations: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub organization_num_employees_ranges: Vec<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub q_organization_keyword_tags: Vec<&'a str>,
}

impl<'a> SearchRequest<'a> {
    /// Builds the body for `filters` at `page`. Blank filters are omitted.
    pub(crate) fn new(filters: &'a SearchFilters, page: u32) -> Self {
        Self {
            page,
            per_page: filters.per_page,
            q_organization_name: non_blank(&filters.company_name),
            organization_locations: non_blank(&filters.location).into_iter().collect(),
            organization_num_employees_ranges: match filters.employee_range {
                EmployeeRange::All => Vec::new(),
                range => vec![range.token()],
            },
            q_organization_keyword_tags: non_blank(&filters.business_area)
                .into_iter()
                .collect(),
        }
    }
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|t| !t.is_empty())
}
