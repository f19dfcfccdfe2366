//! Client-side narrowing and ordering of a page of search results.

use std::cmp::Ordering;

use crate::record::CompanyRecord;

/// Provider industry names and the Portuguese labels users filter by.
const INDUSTRY_TRANSLATIONS: &[(&str, &str)] = &[
    ("Agriculture", "Agronegócio"),
    ("Information Technology", "Tecnologia"),
    ("Healthcare", "Saúde"),
    ("Financial Services", "Finanças"),
    ("Manufacturing", "Manufatura"),
    ("Construction", "Construção"),
    ("Real Estate", "Imobiliário"),
    ("Education", "Educação"),
    ("Retail", "Varejo"),
    ("Telecommunications", "Telecomunicações"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Industry,
    /// Largest first.
    Employees,
    /// Largest first.
    Revenue,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "industry" => Ok(SortKey::Industry),
            "employees" => Ok(SortKey::Employees),
            "revenue" => Ok(SortKey::Revenue),
            other => Err(format!(
                "unknown sort key \"{other}\" (expected name, industry, employees or revenue)"
            )),
        }
    }
}

/// Portuguese label for a provider industry, or the industry itself.
#[must_use]
pub fn translate_industry(industry: &str) -> &str {
    INDUSTRY_TRANSLATIONS
        .iter()
        .find(|(en, _)| *en == industry)
        .map_or(industry, |(_, pt)| *pt)
}

/// Keeps records whose industry (raw or translated) is in `selected`.
///
/// An empty selection keeps everything; records without an industry are
/// dropped whenever a selection is active.
#[must_use]
pub fn filter_by_industries(records: Vec<CompanyRecord>, selected: &[String]) -> Vec<CompanyRecord> {
    if selected.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| {
            r.industry().is_some_and(|industry| {
                let translated = translate_industry(industry);
                selected.iter().any(|s| s == industry || s == translated)
            })
        })
        .collect()
}

/// Stable sort by `key`. Missing numeric values sort as zero.
pub fn sort_companies(records: &mut [CompanyRecord], key: SortKey) {
    records.sort_by(|a, b| match key {
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Industry => a
            .industry()
            .unwrap_or_default()
            .cmp(b.industry().unwrap_or_default()),
        SortKey::Employees => b
            .num_employees()
            .unwrap_or(0)
            .cmp(&a.num_employees().unwrap_or(0)),
        SortKey::Revenue => b
            .annual_revenue()
            .unwrap_or(0.0)
            .partial_cmp(&a.annual_revenue().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
    });
}
