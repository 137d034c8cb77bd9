//! Error types for client initialization and query execution.
//!
//! "Not found" is not represented here: an empty result is `Ok(None)`.

use thiserror::Error;

/// Errors that prevent a service handle from being created.
///
/// These are fatal at startup; nothing can be looked up without a handle.
#[derive(Debug, Error)]
pub enum InitError {
    /// The configuration carries no project to address.
    #[error("Project id is empty")]
    MissingProjectId,

    /// The configured endpoint is not a usable base URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint that was rejected
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {reason}")]
    HttpClient {
        /// The reason for the failure
        reason: String,
    },
}

/// Errors raised while executing a query against the remote service.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The request never produced a response.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// The request exceeded the configured timeout.
    #[error("Request timed out: {reason}")]
    Timeout {
        /// Details reported by the HTTP client
        reason: String,
    },

    /// The service answered with a non-success status.
    #[error("Service error {status} ({}): {message}", .code.as_deref().unwrap_or("UNKNOWN"))]
    Service {
        /// HTTP status code
        status: u16,
        /// Service status name such as `PERMISSION_DENIED`
        code: Option<String>,
        /// Message from the service, or the raw body
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// A matching document has a field of an unexpected type.
    #[error("Malformed document '{document}': {reason}")]
    MalformedDocument {
        /// Resource name of the offending document
        document: String,
        /// What was wrong with it
        reason: String,
    },
}

impl RequestError {
    /// Checks if the failure happened before the service could answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RequestError::Network { .. } | RequestError::Timeout { .. }
        )
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout {
                reason: err.to_string(),
            }
        } else if err.is_decode() {
            RequestError::Parse {
                reason: err.to_string(),
            }
        } else {
            RequestError::Network {
                reason: err.to_string(),
            }
        }
    }
}
