//! Fills in missing locations by asking an external service, one record at
//! a time and never faster than the configured minimum interval.

use std::time::Duration;

use async_trait::async_trait;

use onset_core::{AppConfig, CompanyRecord, LocationTriple};

use crate::client::LocationInferenceClient;
use crate::error::EnrichError;
use crate::rate_limit::MinIntervalLimiter;

/// Fields whose presence means a record already has a location.
const LOCATION_FIELDS: &[&str] = &[
    "city",
    "organization_city",
    "state",
    "organization_state",
    "country",
    "organization_country",
];

/// Resolves a company website to a location.
#[async_trait]
pub trait LocationLookup: Send + Sync {
    async fn lookup(&self, website: &str) -> Result<LocationTriple, EnrichError>;
}

#[async_trait]
impl LocationLookup for LocationInferenceClient {
    async fn lookup(&self, website: &str) -> Result<LocationTriple, EnrichError> {
        self.infer_location(website).await
    }
}

/// Notifications emitted while enriching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichEvent {
    /// `current` of `total` records processed.
    Progress { current: usize, total: usize },
    /// The service asked us to slow down; pausing for `cooldown`.
    RateLimited { cooldown: Duration },
    /// Cooldown over, resuming with the same record.
    Resumed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Records that needed a lookup.
    pub attempted: usize,
    /// Lookups that produced at least one location part.
    pub enriched: usize,
    /// Lookups that failed with a non-rate-limit error.
    pub failed: usize,
    /// Cooldowns taken.
    pub cooldowns: usize,
}

pub struct Enricher<L> {
    lookup: L,
    limiter: MinIntervalLimiter,
    cooldown: Duration,
}

impl<L: LocationLookup> Enricher<L> {
    #[must_use]
    pub fn new(lookup: L, min_interval: Duration, cooldown: Duration) -> Self {
        Self {
            lookup,
            limiter: MinIntervalLimiter::new(min_interval),
            cooldown,
        }
    }

    /// Uses `ONSET_ENRICH_MIN_INTERVAL_MS` and `ONSET_ENRICH_COOLDOWN_SECS`.
    #[must_use]
    pub fn from_config(lookup: L, config: &AppConfig) -> Self {
        Self::new(
            lookup,
            Duration::from_millis(config.enrich_min_interval_ms),
            Duration::from_secs(config.enrich_cooldown_secs),
        )
    }

    /// Looks up a location for every record that has a website but none of
    /// the location fields, writing `city`, `state` and `country` in place.
    ///
    /// Other records pass through untouched. A rate-limit answer pauses for
    /// the cooldown and retries the same record without counting it as an
    /// attempt; any other failure leaves the record as it was.
    pub async fn enrich(
        &mut self,
        records: &mut [CompanyRecord],
        mut on_event: impl FnMut(EnrichEvent),
    ) -> EnrichStats {
        let total = records.len();
        let mut stats = EnrichStats::default();

        for (index, record) in records.iter_mut().enumerate() {
            if let Some(website) = lookup_target(record) {
                stats.attempted += 1;
                loop {
                    self.limiter.acquire().await;
                    match self.lookup.lookup(&website).await {
                        Ok(triple) => {
                            if apply(record, &triple) {
                                stats.enriched += 1;
                            }
                            break;
                        }
                        Err(EnrichError::RateLimited) => {
                            stats.cooldowns += 1;
                            tracing::warn!(
                                cooldown_secs = self.cooldown.as_secs(),
                                website = %website,
                                "inference service rate limited, cooling down"
                            );
                            on_event(EnrichEvent::RateLimited {
                                cooldown: self.cooldown,
                            });
                            tokio::time::sleep(self.cooldown).await;
                            on_event(EnrichEvent::Resumed);
                        }
                        Err(e) => {
                            stats.failed += 1;
                            tracing::warn!(website = %website, error = %e, "location lookup failed");
                            break;
                        }
                    }
                }
            }
            on_event(EnrichEvent::Progress {
                current: index + 1,
                total,
            });
        }

        tracing::info!(
            total,
            attempted = stats.attempted,
            enriched = stats.enriched,
            failed = stats.failed,
            cooldowns = stats.cooldowns,
            "location enrichment finished"
        );
        stats
    }
}

/// The website to look up, if the record needs one.
fn lookup_target(record: &CompanyRecord) -> Option<String> {
    if record.first_str(LOCATION_FIELDS).is_some() {
        return None;
    }
    record.website_url().map(str::to_owned)
}

/// Writes the non-empty parts of `triple`. Returns whether anything was written.
fn apply(record: &mut CompanyRecord, triple: &LocationTriple) -> bool {
    let mut wrote = false;
    for (field, value) in [
        ("city", &triple.city),
        ("state", &triple.state),
        ("country", &triple.country),
    ] {
        if !value.is_empty() {
            record.set_str(field, value.as_str());
            wrote = true;
        }
    }
    wrote
}

#[cfg(test)]
#[path = "enricher_test.rs"]
mod tests;
