use serde::{Deserialize, Serialize};

/// Page size used by every search the tool issues.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Employee-count bucket accepted by the search provider.
///
/// Tokens are the provider's `"min,max"` strings; `All` sends no range at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmployeeRange {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "201,500")]
    From201To500,
    #[serde(rename = "501,1000")]
    From501To1000,
    #[serde(rename = "1001,5000")]
    From1001To5000,
    #[serde(rename = "5001,10000")]
    From5001To10000,
    #[serde(rename = "10001,50000")]
    From10001To50000,
}

impl EmployeeRange {
    pub const ALL: [EmployeeRange; 6] = [
        EmployeeRange::All,
        EmployeeRange::From201To500,
        EmployeeRange::From501To1000,
        EmployeeRange::From1001To5000,
        EmployeeRange::From5001To10000,
        EmployeeRange::From10001To50000,
    ];

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            EmployeeRange::All => "all",
            EmployeeRange::From201To500 => "201,500",
            EmployeeRange::From501To1000 => "501,1000",
            EmployeeRange::From1001To5000 => "1001,5000",
            EmployeeRange::From5001To10000 => "5001,10000",
            EmployeeRange::From10001To50000 => "10001,50000",
        }
    }

    /// Parses a provider token (`"201,500"`) or `"all"`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.token() == token.trim())
    }
}

impl std::fmt::Display for EmployeeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Criteria for one search request.
///
/// Treated as immutable per request: the batch collector derives per-page
/// copies with [`SearchFilters::for_page`] instead of mutating a shared value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub company_name: String,
    pub location: String,
    pub employee_range: EmployeeRange,
    pub business_area: String,
    pub page: u32,
    pub per_page: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            location: "Brasil".to_string(),
            employee_range: EmployeeRange::All,
            business_area: String::new(),
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchFilters {
    /// Copy of these filters targeting `page`.
    #[must_use]
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Pagination block of a search response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_entries: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// Describes one filter the provider applied to a search.
///
/// Location breadcrumbs carry a `"City, State, Country"` display name that
/// the export table uses to fill gaps in a record's own location fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Breadcrumb {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub signal_field_name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub display_name: String,
}

impl Breadcrumb {
    #[must_use]
    pub fn is_location(&self) -> bool {
        self.signal_field_name == "organization_locations" || self.label == "Company Locations"
    }
}
