//! Error types for YouTube API operations.

use thiserror::Error;

use super::types::ApiErrorBody;
use crate::http::HttpError;
use crate::remote::RemoteError;

/// Errors that can occur when talking to the YouTube Data API.
#[derive(Debug, Error)]
pub enum YoutubeError {
    /// The transport failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request needs a user token and none is configured.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The channel does not exist or exposes no uploads playlist.
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl YoutubeError {
    /// Build an API error from a status and raw response body, preferring the
    /// message inside a standard Google error envelope.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
        Self::Api { status, message }
    }

    /// HTTP status carried by an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<YoutubeError> for RemoteError {
    fn from(err: YoutubeError) -> Self {
        match err {
            YoutubeError::Http(e) => RemoteError::network(e.to_string()),
            YoutubeError::Json(e) => RemoteError::decode(e.to_string()),
            YoutubeError::Api { status, message } => match status {
                401 => RemoteError::AuthRequired,
                404 => RemoteError::not_found(message),
                _ => RemoteError::api(status, message),
            },
            YoutubeError::Auth(_) => RemoteError::AuthRequired,
            YoutubeError::ChannelNotFound(id) => RemoteError::not_found(format!("channel: {id}")),
            YoutubeError::Config(msg) | YoutubeError::InvalidRequest(msg) => {
                RemoteError::invalid_request(msg)
            }
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &YoutubeError) -> String {
    match err {
        YoutubeError::Http(_) => "Network error".to_string(),
        YoutubeError::Json(_) => "JSON parse error".to_string(),
        YoutubeError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {status}: {truncated}...")
            } else {
                format!("HTTP {status}: {message}")
            }
        }
        YoutubeError::Auth(_) => "Authentication failed".to_string(),
        YoutubeError::ChannelNotFound(id) => format!("Channel not found: {id}"),
        YoutubeError::Config(msg) => format!("Config: {msg}"),
        YoutubeError::InvalidRequest(msg) => format!("Invalid request: {msg}"),
    }
}
