use thiserror::Error;

/// Errors returned by the Beacon HTTP pipelines.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected locally; no request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A multipart part could not be framed (bad header text or boundary collision).
    #[error("multipart encoding failed: {0}")]
    Encoding(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("malformed response for {context}: {source}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Coarse classification callers use to pick user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    EncodingFailure,
    NetworkFailure,
    NonSuccessStatus,
    MalformedResponse,
}

impl ClientError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Validation(_) => FailureKind::Validation,
            ClientError::Encoding(_) | ClientError::InvalidUrl { .. } => {
                FailureKind::EncodingFailure
            }
            ClientError::Http(_) => FailureKind::NetworkFailure,
            ClientError::UnexpectedStatus { .. } => FailureKind::NonSuccessStatus,
            ClientError::MalformedResponse { .. } => FailureKind::MalformedResponse,
        }
    }
}
