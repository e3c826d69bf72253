//! Error types for BlueLink client operations

use thiserror::Error;

/// Result type alias for BlueLink client operations
pub type Result<T> = std::result::Result<T, BlueLinkError>;

/// Errors that can occur during BlueLink client operations
#[derive(Error, Debug)]
pub enum BlueLinkError {
    /// One or more credentials were not provided and not found in the environment
    #[error("Bluelink credentials were not provided.")]
    MissingCredentials,

    /// A vehicle or account request was made before `login()`
    #[error("You must login first.")]
    NotLoggedIn,

    /// The anti-forgery token was rejected during login
    #[error("Failed to get CSRF token.")]
    CsrfRejected,

    /// Remote service answered with a non-200 status
    #[error("Action {action} responded with status code {status}.")]
    Status { action: String, status: u16 },

    /// Response body was not JSON
    #[error("Invalid JSON response from API for {action}: {body}")]
    MalformedResponse { action: String, body: String },

    /// Remote service rejected the request
    #[error("BlueLink {action} request failed due to: {message}")]
    Remote { action: String, message: String },

    /// A previous command for this vehicle is still being processed
    #[error(
        "Unable to send your request because a previous request is pending. Please wait and try again later."
    )]
    RequestPending,

    /// Envelope validated but lacked a field we need
    #[error("Unexpected response from API for {action}: {detail}")]
    UnexpectedResponse { action: String, detail: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl BlueLinkError {
    /// Create an unexpected-response error for `action`
    pub fn unexpected(action: &str, detail: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            action: action.to_string(),
            detail: detail.into(),
        }
    }

    /// Whether this error came from talking to the service, as opposed to
    /// local configuration.
    pub fn is_request_failure(&self) -> bool {
        !matches!(self, Self::MissingCredentials)
    }
}
