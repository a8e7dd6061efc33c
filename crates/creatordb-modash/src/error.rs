use thiserror::Error;

/// Errors returned by the Modash API client.
#[derive(Debug, Error)]
pub enum ModashError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429, or an API error message indicating a rate limit.
    #[error("rate limited by Modash (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The requested profile does not exist.
    #[error("not found: {url}")]
    NotFound { url: String },

    /// The API returned `"error": true` with a message.
    #[error("Modash API error: {0}")]
    ApiError(String),

    /// Non-2xx HTTP status that is neither 404 nor 429.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but lacked the fields needed for a canonical creator.
    #[error("normalization error: {reason}")]
    Normalization { reason: String },
}
