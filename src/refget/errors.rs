/// Errors from the refget request layer.
use thiserror::Error;

/// Request failures that are not timeouts.
///
/// Timeouts never surface here: they become timeout records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// DNS, connection refused, TLS, or any other transport failure.
    #[error("request for '{id}' failed: {source}")]
    Transport {
        /// The identifier being fetched.
        id: String,
        source: reqwest::Error,
    },

    /// A successful response whose body is not JSON.
    #[error("response for '{id}' is not valid JSON: {source}")]
    MalformedBody {
        /// The identifier being fetched.
        id: String,
        source: serde_json::Error,
    },

    /// A successful response whose JSON body is not an object.
    #[error("response for '{id}' is a JSON {kind}, expected an object")]
    UnexpectedPayload {
        /// The identifier being fetched.
        id: String,
        /// The JSON type that was received.
        kind: &'static str,
    },
}

impl FetchError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Client(_) => 1,
            Self::Transport { .. } | Self::MalformedBody { .. } | Self::UnexpectedPayload { .. } => 3,
        }
    }
}
