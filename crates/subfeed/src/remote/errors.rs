use thiserror::Error;

/// Errors returned by a [`ChannelIndex`](super::ChannelIndex) implementation.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request needs the user's authorization and none was supplied, or
    /// the supplied token was rejected.
    #[error("Authentication required")]
    AuthRequired,

    /// The requested channel or container does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Connection or transport failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The response body did not match the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// The request was rejected before being sent.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl RemoteError {
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    #[inline]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// HTTP status carried by an API error.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, so multi-line decoder output
/// stays on one progress line.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
