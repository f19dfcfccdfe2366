use serde_json::Value;

use super::{infer_country_from_domain, leading_pair, trailing_pair};
use crate::record::CompanyRecord;

const CITY_FIELDS: &[&str] = &[
    "city",
    "headquarters_city",
    "primary_city",
    "organization_city",
    "location_city",
    "office_city",
];

const STATE_FIELDS: &[&str] = &[
    "state",
    "headquarters_state",
    "primary_state",
    "organization_state",
    "location_state",
    "office_state",
];

const COUNTRY_FIELDS: &[&str] = &[
    "country",
    "headquarters_country",
    "primary_country",
    "organization_country",
    "location_country",
];

const LOCATION_STRING_FIELDS: &[&str] = &[
    "location",
    "headquarters",
    "primary_location",
    "office_location",
    "business_address",
    "registered_address",
];

const LOCATION_ARRAY_FIELDS: &[&str] = &[
    "organization_city_localities",
    "locations",
    "offices",
    "addresses",
];

const FULL_ADDRESS_FIELDS: &[&str] = &[
    "full_address",
    "address",
    "primary_address",
    "mailing_address",
    "street_address",
];

const NOT_AVAILABLE: &str = "N/A";

/// Human-readable location for listings and CSV exports.
///
/// Probes, first match wins:
/// 1. `headquarters_address` (first two comma segments)
/// 2. city/state/country under their alternate names
/// 3. `organization_locations[0]`
/// 4. single-string location fields
/// 5. array location fields (first element)
/// 6. full street-address fields (last two comma segments)
/// 7. country inferred from the domain suffix
///
/// Returns `"N/A"` when nothing matches. Brazil is the assumed home market,
/// so a Brazilian country value is left out of step 2's joined string.
#[must_use]
pub fn display_location(record: &CompanyRecord) -> String {
    if let Some(hq) = record
        .str_field("headquarters_address")
        .filter(|s| !s.trim().is_empty())
    {
        return leading_pair(hq);
    }

    if let Some(joined) = joined_city_state_country(record) {
        return joined;
    }

    // The first entry wins even when blank; only non-string entries fall through.
    if let Some(Value::String(first)) = record
        .array_field("organization_locations")
        .and_then(<[Value]>::first)
    {
        return leading_pair(first);
    }

    for field in LOCATION_STRING_FIELDS {
        if let Some(value) = non_blank_str(record, field) {
            return leading_pair(value);
        }
    }

    for field in LOCATION_ARRAY_FIELDS {
        let first = record
            .array_field(field)
            .and_then(<[Value]>::first)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty());
        if let Some(value) = first {
            return leading_pair(value);
        }
    }

    for field in FULL_ADDRESS_FIELDS {
        if let Some(value) = non_blank_str(record, field) {
            return trailing_pair(value);
        }
    }

    record
        .primary_domain()
        .and_then(infer_country_from_domain)
        .or_else(|| record.website_url().and_then(infer_country_from_domain))
        .map_or_else(|| NOT_AVAILABLE.to_string(), str::to_string)
}

fn joined_city_state_country(record: &CompanyRecord) -> Option<String> {
    let city = record.first_str(CITY_FIELDS);
    let state = record.first_str(STATE_FIELDS);
    let country = record.first_str(COUNTRY_FIELDS);

    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if let Some(city) = city {
        parts.push(city);
    }
    if let Some(state) = state.filter(|s| Some(*s) != city) {
        parts.push(state);
    }
    if let Some(country) = country.filter(|c| !is_brazil(c)) {
        parts.push(country);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// True for the spellings of Brazil the provider is known to return.
fn is_brazil(country: &str) -> bool {
    if matches!(country, "Brazil" | "Brasil" | "BR") {
        return true;
    }
    let lower = country.to_lowercase();
    lower.contains("brazil") || lower.contains("brasil")
}

fn non_blank_str<'a>(record: &'a CompanyRecord, field: &str) -> Option<&'a str> {
    record.str_field(field).filter(|s| !s.trim().is_empty())
}
