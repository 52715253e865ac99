use thiserror::Error;

/// Errors returned by the place-search API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A pagination token was used before its warm-up period elapsed.
    ///
    /// The API issues the next-page token a few seconds before it becomes
    /// valid; requests made too early fail with this transient status and
    /// must be retried, not treated as fatal.
    #[error("page token not yet valid")]
    TokenNotReady,

    /// The API reported its query quota as exhausted for now.
    #[error("query quota exceeded: {0}")]
    OverQuota(String),

    /// The API returned a permanent error status for this request.
    #[error("places API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
