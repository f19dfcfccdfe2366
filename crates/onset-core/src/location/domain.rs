/// Country-code suffixes checked after the Brazilian ones, in order.
const DOMAIN_COUNTRIES: &[(&str, &str)] = &[
    (".com.ar", "Argentina"),
    (".com.mx", "México"),
    (".com.co", "Colômbia"),
    (".com.pe", "Peru"),
    (".com.cl", "Chile"),
    (".com.uy", "Uruguai"),
    (".com.py", "Paraguai"),
    (".com.bo", "Bolívia"),
    (".com.ec", "Equador"),
    (".com.ve", "Venezuela"),
];

/// Guesses a country from a domain or website URL suffix.
///
/// Accepts either a bare domain (`acme.com.ar`) or a URL
/// (`https://www.acme.com.ar/contato`); only the host is inspected.
#[must_use]
pub fn infer_country_from_domain(domain_or_url: &str) -> Option<&'static str> {
    let host = host_of(domain_or_url);
    if host.is_empty() {
        return None;
    }
    if host.ends_with(".com.br") || host.ends_with(".br") {
        return Some("Brasil");
    }
    DOMAIN_COUNTRIES
        .iter()
        .find(|(suffix, _)| host.ends_with(suffix))
        .map(|(_, country)| *country)
}

/// Lowercased host portion of a URL or bare domain.
fn host_of(value: &str) -> String {
    let trimmed = value.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map_or(trimmed, |(_, rest)| rest);
    without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase()
}
