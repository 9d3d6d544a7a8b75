//! Translation platform transport errors.

use thiserror::Error;

/// Maximum length of a response body kept in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Errors that can occur while talking to the translation platform.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("Remote platform unavailable: {0}")]
    Unavailable(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The platform answered with a non-success status.
    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The HTTP client itself could not be built or configured.
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl RemoteError {
    /// Maps a reqwest failure for `url` onto the matching variant.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            RemoteError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            RemoteError::Unavailable(format!("{}: {}", url, err))
        }
    }

    /// Builds a [`RemoteError::Status`], truncating the body so large error
    /// pages do not flood the logs.
    pub fn status(url: &str, status: u16, body: &str) -> Self {
        let body = if body.len() > MAX_ERROR_BODY_LENGTH {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated)", &body[..end])
        } else {
            body.to_string()
        };
        RemoteError::Status {
            url: url.to_string(),
            status,
            body,
        }
    }

    /// Returns true if the error is likely transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Unavailable(_) | RemoteError::Timeout { .. } => true,
            RemoteError::Status { status, .. } => *status == 429 || *status >= 500,
            RemoteError::Decode { .. } | RemoteError::Client(_) => false,
        }
    }
}
