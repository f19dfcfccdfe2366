//! Extracts the labelled `Cidade:` / `Estado:` / `País:` answer lines.

use std::sync::LazyLock;

use regex::Regex;

use onset_core::LocationTriple;

static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Cidade:\s*([^\n,]*)").expect("valid regex"));
static STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Estado:\s*([^\n,]*)").expect("valid regex"));
static COUNTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Pa[ií]s:\s*([^\n,]*)").expect("valid regex"));

/// Parses a model answer into a triple. Missing labels and `N/A` answers
/// become empty strings, so an unknown part is never written into a record
/// and the export table can still fill it from the search breadcrumbs.
#[must_use]
pub fn parse_location_answer(text: &str) -> LocationTriple {
    LocationTriple::new(
        capture(&CITY_RE, text),
        capture(&STATE_RE, text),
        capture(&COUNTRY_RE, text),
    )
}

fn capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("N/A"))
        .unwrap_or_default()
        .to_string()
}
