//! Feed client and decoder error types.

/// Errors from fetching a feed endpoint.
///
/// These are recoverable: a failing endpoint contributes nothing to the
/// current refresh cycle and is retried on the next one.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (connection refused, reset, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The credential was rejected
    #[error("unauthorized: check MTA_KEY")]
    Unauthorized,

    /// Endpoint returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The API key cannot be sent as a header value
    #[error("invalid API key format")]
    InvalidApiKey,

    /// Endpoint unavailable for another reason
    #[error("feed unavailable: {0}")]
    Unavailable(String),
}

/// Errors from decoding a feed payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Payload is not a valid GTFS-realtime message
    #[error("protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),
}
