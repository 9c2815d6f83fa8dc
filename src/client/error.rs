//! Error types for the signed API client.

use thiserror::Error;

/// HTTP status the API uses for absent resources.
pub const NOT_FOUND: u16 = 404;

/// Errors raised while calling the OVH API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when the request never completed at the HTTP level (connection
    /// refused, timeout, malformed request).
    #[error("transport error calling {url}: {message}")]
    Transport {
        /// Target URL of the failed request.
        url: String,
        /// Message returned by the HTTP stack.
        message: String,
    },
    /// Raised when a request body cannot be serialised.
    #[error("failed to encode request body for {path}: {message}")]
    Encode {
        /// API path the body was destined for.
        path: String,
        /// Serialiser error message.
        message: String,
    },
    /// Structured error decoded from a non-accepted response.
    #[error("OVH API returned {status}: {message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Vendor error code, when provided.
        error_code: Option<String>,
        /// Vendor HTTP code description, when provided.
        http_code: Option<String>,
        /// Human-readable message supplied by the API.
        message: String,
    },
    /// Fallback for non-accepted responses without a decodable error body.
    #[error("status {status} - {reason}")]
    Status {
        /// HTTP status of the response.
        status: u16,
        /// Reason phrase reported by the server.
        reason: String,
    },
    /// Raised when a successful response cannot be decoded.
    #[error("failed to decode {target} response: {message}")]
    Decode {
        /// Type the body was decoded into.
        target: &'static str,
        /// Deserialiser error message.
        message: String,
    },
}

impl ClientError {
    /// Returns the HTTP status carried by remote errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Encode { .. } | Self::Decode { .. } => None,
        }
    }

    /// Reports whether the remote side answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(NOT_FOUND))
    }
}
