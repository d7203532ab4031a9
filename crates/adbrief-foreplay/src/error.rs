use thiserror::Error;

/// Errors returned by the Foreplay API client.
///
/// [`crate::ForeplayClient::resolve_brand`] and [`crate::ForeplayClient::fetch_ads`]
/// log these and degrade to an empty result instead of returning them.
#[derive(Debug, Error)]
pub enum ForeplayError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
