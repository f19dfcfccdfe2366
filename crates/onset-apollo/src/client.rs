//! HTTP client for Apollo's company search, either through the same-origin
//! relay or directly with an API key.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use onset_core::{AppConfig, ApolloMode, SearchFilters};

use crate::error::ApolloError;
use crate::request::SearchRequest;
use crate::types::{RelayErrorBody, SearchPage, SearchResponse};

const SEARCH_ENDPOINT: &str = "/mixed_companies/search";
const DEFAULT_USER_AGENT: &str = "onset/0.1 (lead-collection)";

#[derive(Clone)]
enum Target {
    /// POST `{url}?endpoint=/mixed_companies/search`; the relay holds the key.
    Relay { url: Url },
    /// POST `{base}/mixed_companies/search` with `X-Api-Key`.
    Direct { base_url: Url, api_key: String },
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Relay { url } => f.debug_struct("Relay").field("url", &url.as_str()).finish(),
            Target::Direct { base_url, .. } => f
                .debug_struct("Direct")
                .field("base_url", &base_url.as_str())
                .field("api_key", &"[redacted]")
                .finish(),
        }
    }
}

/// Client for the Apollo company search.
///
/// Use [`ApolloClient::from_config`] in the CLI, or [`ApolloClient::with_base_url`]
/// and [`ApolloClient::relay`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ApolloClient {
    client: Client,
    target: Target,
}

impl ApolloClient {
    /// Builds a client for the mode, timeout and user agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApolloError::MissingCredential`] when neither mode is
    /// configured, [`ApolloError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ApolloError::InvalidUrl`] for an unparseable relay or base URL.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApolloError> {
        let mode = config
            .apollo
            .as_ref()
            .ok_or(ApolloError::MissingCredential)?;
        let client = build_http_client(config.apollo_request_timeout_secs, &config.user_agent)?;
        let target = match mode {
            ApolloMode::Relay { url } => Target::Relay {
                url: parse_url(url)?,
            },
            ApolloMode::Direct { api_key, base_url } => Target::Direct {
                base_url: parse_base_url(base_url)?,
                api_key: api_key.clone(),
            },
        };
        Ok(Self { client, target })
    }

    /// Direct-mode client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// See [`ApolloClient::from_config`].
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, ApolloError> {
        Ok(Self {
            client: build_http_client(timeout_secs, DEFAULT_USER_AGENT)?,
            target: Target::Direct {
                base_url: parse_base_url(base_url)?,
                api_key: api_key.to_owned(),
            },
        })
    }

    /// Relay-mode client.
    ///
    /// # Errors
    ///
    /// See [`ApolloClient::from_config`].
    pub fn relay(relay_url: &str, timeout_secs: u64) -> Result<Self, ApolloError> {
        Ok(Self {
            client: build_http_client(timeout_secs, DEFAULT_USER_AGENT)?,
            target: Target::Relay {
                url: parse_url(relay_url)?,
            },
        })
    }

    /// Fetches one page of companies matching `filters`.
    ///
    /// The page number comes from `page`, not `filters.page`, so one set of
    /// filters can drive a whole batch run.
    ///
    /// # Errors
    ///
    /// - [`ApolloError::InvalidPage`] when `page` is 0.
    /// - [`ApolloError::RateLimited`] on HTTP 429.
    /// - [`ApolloError::Relay`] when the relay answers with its own error body.
    /// - [`ApolloError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ApolloError::Deserialize`] if the body is not valid JSON.
    /// - [`ApolloError::MissingOrganizations`] if the body has no organizations list.
    /// - [`ApolloError::Http`] on network failure.
    pub async fn search_companies(
        &self,
        filters: &SearchFilters,
        page: u32,
    ) -> Result<SearchPage, ApolloError> {
        if page == 0 {
            return Err(ApolloError::InvalidPage);
        }

        let url = self.search_url();
        let body = SearchRequest::new(filters, page);

        let mut request = self
            .client
            .post(url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .json(&body);
        if let Target::Direct { api_key, .. } = &self.target {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApolloError::RateLimited);
        }

        if !status.is_success() {
            if matches!(self.target, Target::Relay { .. }) {
                if let Ok(relay) = serde_json::from_str::<RelayErrorBody>(&text) {
                    return Err(ApolloError::Relay {
                        status: status.as_u16(),
                        message: relay.error,
                    });
                }
            }
            return Err(ApolloError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| ApolloError::Deserialize {
                context: format!("company search page {page}"),
                source: e,
            })?;

        let organizations = parsed
            .organizations
            .ok_or(ApolloError::MissingOrganizations { page })?;

        tracing::debug!(
            page,
            count = organizations.len(),
            total_entries = parsed.pagination.total_entries,
            "fetched company search page"
        );

        Ok(SearchPage {
            organizations,
            pagination: parsed.pagination,
            breadcrumbs: parsed.breadcrumbs,
        })
    }

    fn search_url(&self) -> Url {
        match &self.target {
            Target::Relay { url } => {
                let mut url = url.clone();
                url.query_pairs_mut().append_pair("endpoint", SEARCH_ENDPOINT);
                url
            }
            Target::Direct { base_url, .. } => {
                let mut url = base_url.clone();
                // `base_url` always ends with one slash.
                let joined = format!("{}{}", url.path(), SEARCH_ENDPOINT.trim_start_matches('/'));
                url.set_path(&joined);
                url
            }
        }
    }
}

fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ApolloError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

fn parse_url(raw: &str) -> Result<Url, ApolloError> {
    Url::parse(raw).map_err(|e| ApolloError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Normalises to exactly one trailing slash so the endpoint path appends
/// instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, ApolloError> {
    parse_url(&format!("{}/", raw.trim_end_matches('/')))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
