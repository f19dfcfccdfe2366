use thiserror::Error;

/// Errors returned by the location inference client.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 from the inference service. The enricher cools down and
    /// retries the same record.
    #[error("rate limited by the inference service")]
    RateLimited,

    #[error("unexpected HTTP status {status} from inference service")]
    UnexpectedStatus { status: u16 },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("location enrichment requires OPENAI_API_KEY")]
    MissingApiKey,

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
