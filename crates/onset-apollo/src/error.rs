use thiserror::Error;

/// Errors returned by the Apollo search client.
#[derive(Debug, Error)]
pub enum ApolloError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay rejected the request (bad method, missing endpoint,
    /// missing server credential, or unparseable body).
    #[error("relay error {status}: {message}")]
    Relay { status: u16, message: String },

    #[error("company search requires APOLLO_API_KEY or ONSET_APOLLO_RELAY_URL")]
    MissingCredential,

    #[error("rate limited by Apollo (HTTP 429)")]
    RateLimited,

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but carried no `organizations` list.
    #[error("response for page {page} has no organizations list")]
    MissingOrganizations { page: u32 },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("page numbers start at 1")]
    InvalidPage,
}
