use super::{split_segments, LocationTriple};
use crate::record::CompanyRecord;
use crate::search::Breadcrumb;

/// Splits a record's location into `(city, state, country)` for the export table.
///
/// `headquarters_address` wins when present and is read by segment count:
/// one segment is a country, two are city and country, three or more are
/// city, state and country. Otherwise `city`/`organization_city`,
/// `state`/`organization_state` and `country`/`organization_country` are
/// used, and any part still missing is filled from location breadcrumbs of
/// the search that produced the record.
#[must_use]
pub fn extract_triple(record: &CompanyRecord, breadcrumbs: &[Breadcrumb]) -> LocationTriple {
    if let Some(hq) = record.str_field("headquarters_address") {
        if hq.contains(',') {
            match split_segments(hq).as_slice() {
                [] => {}
                [country] => return LocationTriple::new("", "", *country),
                [city, country] => return LocationTriple::new(*city, "", *country),
                [city, state, country, ..] => return LocationTriple::new(*city, *state, *country),
            }
        } else if !hq.trim().is_empty() {
            return LocationTriple::new("", "", hq.trim());
        }
    }

    let mut triple = LocationTriple::new(
        record.first_str(&["city", "organization_city"]).unwrap_or_default(),
        record.first_str(&["state", "organization_state"]).unwrap_or_default(),
        record.first_str(&["country", "organization_country"]).unwrap_or_default(),
    );

    let incomplete = triple.city.is_empty() || triple.state.is_empty() || triple.country.is_empty();
    if incomplete {
        for crumb in breadcrumbs.iter().filter(|b| b.is_location() && !b.display_name.is_empty()) {
            let parts: Vec<&str> = crumb.display_name.split(',').map(str::trim).collect();
            fill_if_empty(&mut triple.city, parts.first());
            fill_if_empty(&mut triple.state, parts.get(1));
            fill_if_empty(&mut triple.country, parts.get(2));
        }
    }

    triple
}

fn fill_if_empty(slot: &mut String, candidate: Option<&&str>) {
    if slot.is_empty() {
        if let Some(value) = candidate.filter(|v| !v.is_empty()) {
            (*value).clone_into(slot);
        }
    }
}
