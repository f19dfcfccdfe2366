//! Location heuristics over loosely structured company records.
//!
//! Two extractors live here and are deliberately kept apart:
//!
//! - [`display_location`] produces the single string shown in listings and
//!   in the CSV exports. It probes a long, priority-ordered list of field
//!   names and falls back to domain-suffix inference and finally `"N/A"`.
//! - [`extract_triple`] produces the `(city, state, country)` columns of the
//!   enriched export table. It looks at far fewer fields and interprets
//!   `headquarters_address` by segment count rather than taking a prefix.
//!
//! The two disagree on some inputs (e.g. `"São Paulo, Brasil"` displays as
//! `"São Paulo, Brasil"` but splits into city `São Paulo` and country
//! `Brasil`). Both outputs are user-visible, so neither is derived from the
//! other.

mod display;
mod domain;
mod triple;

pub use display::display_location;
pub use domain::infer_country_from_domain;
pub use triple::extract_triple;

use serde::{Deserialize, Serialize};

/// City, state and country of a company. Empty strings mean "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationTriple {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl LocationTriple {
    #[must_use]
    pub fn new(city: impl Into<String>, state: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            country: country.into(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.state.is_empty() && self.country.is_empty()
    }
}

/// Splits on commas, trims each segment and drops empty ones.
fn split_segments(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// `"City, State"` from the first two segments of a comma-separated value,
/// or the value unchanged when it has fewer than two segments.
fn leading_pair(value: &str) -> String {
    if value.contains(',') {
        let parts = split_segments(value);
        if parts.len() >= 2 {
            return parts[..2].join(", ");
        }
    }
    value.to_string()
}

/// Same as [`leading_pair`] but keeps the last two segments; full street
/// addresses end with the city and state.
fn trailing_pair(value: &str) -> String {
    if value.contains(',') {
        let parts = split_segments(value);
        if parts.len() >= 2 {
            return parts[parts.len() - 2..].join(", ");
        }
    }
    value.to_string()
}
