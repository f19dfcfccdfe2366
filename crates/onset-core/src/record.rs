//! Loosely typed company record as returned by the search provider.
//!
//! The provider returns organizations with a large and inconsistent set of
//! address-shaped fields (`city`, `organization_city`, `headquarters_address`,
//! `organization_locations`, …). Rather than modelling every variant, the
//! record keeps the raw JSON object and exposes typed accessors for the
//! fields the pipeline relies on, plus generic string/array probes used by
//! the location heuristics.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyRecord {
    fields: Map<String, Value>,
}

impl CompanyRecord {
    #[must_use]
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Provider identifier. Numeric ids are rendered as strings.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or_default()
    }

    #[must_use]
    pub fn industry(&self) -> Option<&str> {
        self.str_field("industry")
    }

    #[must_use]
    pub fn num_employees(&self) -> Option<u64> {
        self.fields
            .get("num_employees")
            .or_else(|| self.fields.get("estimated_num_employees"))
            .and_then(Value::as_u64)
    }

    #[must_use]
    pub fn num_employees_range(&self) -> Option<&str> {
        self.str_field("num_employees_range")
    }

    #[must_use]
    pub fn annual_revenue(&self) -> Option<f64> {
        self.fields.get("annual_revenue").and_then(Value::as_f64)
    }

    #[must_use]
    pub fn website_url(&self) -> Option<&str> {
        self.str_field("website_url")
    }

    #[must_use]
    pub fn primary_domain(&self) -> Option<&str> {
        self.str_field("primary_domain")
    }

    #[must_use]
    pub fn linkedin_url(&self) -> Option<&str> {
        self.str_field("linkedin_url")
    }

    /// `phone`, falling back to `primary_phone.number`.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.str_field("phone").or_else(|| {
            self.fields
                .get("primary_phone")
                .and_then(|p| p.get("number"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    }

    /// Returns the named field when it holds a non-empty string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns the named field when it holds a non-empty array.
    #[must_use]
    pub fn array_field(&self, name: &str) -> Option<&[Value]> {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .filter(|a| !a.is_empty())
    }

    /// First non-empty string among `names`, in order.
    #[must_use]
    pub fn first_str(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.str_field(name))
    }

    /// Adds or replaces a string field. Existing fields are never removed.
    pub fn set_str(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .insert(name.to_owned(), Value::String(value.into()));
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Builds a record from a JSON literal; non-object values yield an empty record.
impl From<Value> for CompanyRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_is_rendered_as_string() {
        let record = CompanyRecord::from(json!({"id": 42}));
        assert_eq!(record.id().as_deref(), Some("42"));
    }

    #[test]
    fn empty_string_fields_are_absent() {
        let record = CompanyRecord::from(json!({"id": "", "industry": ""}));
        assert!(record.id().is_none());
        assert!(record.industry().is_none());
    }

    #[test]
    fn phone_falls_back_to_primary_phone_number() {
        let record = CompanyRecord::from(json!({"primary_phone": {"number": "+55 11 4000-0000"}}));
        assert_eq!(record.phone(), Some("+55 11 4000-0000"));
    }

    #[test]
    fn first_str_respects_priority_order() {
        let record = CompanyRecord::from(json!({
            "organization_city": "Campinas",
            "city": "São Paulo"
        }));
        assert_eq!(
            record.first_str(&["city", "organization_city"]),
            Some("São Paulo")
        );
        assert_eq!(
            record.first_str(&["headquarters_city", "organization_city"]),
            Some("Campinas")
        );
    }

    #[test]
    fn set_str_adds_without_removing_other_fields() {
        let mut record = CompanyRecord::from(json!({"name": "Acme", "website_url": "https://acme.com.br"}));
        record.set_str("city", "Recife");
        assert_eq!(record.str_field("city"), Some("Recife"));
        assert_eq!(record.name(), "Acme");
        assert_eq!(record.website_url(), Some("https://acme.com.br"));
    }

    #[test]
    fn roundtrips_unknown_fields_through_serde() {
        let raw = json!({"id": "abc", "organization_city_localities": ["Niterói"]});
        let record: CompanyRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }
}
