use reqwest::StatusCode;
use thiserror::Error;

/// Failures reading or writing the persisted session.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No home directory available for the session file")]
    NoHomeDir,
}

/// Why a token refresh did not produce a new access token.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Refresh endpoint returned {0}")]
    Rejected(StatusCode),

    #[error("Refresh request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Refresh response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("Could not persist refreshed token: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid refresh endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Errors surfaced by [`crate::Gateway::send`].
///
/// Non-401 error statuses are not errors at this level: the response is handed
/// back to the caller untouched.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Errors from logging in.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{detail}")]
    Rejected { detail: String },

    #[error("Could not reach the backend: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the typed resource API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Backend returned {status}: {detail}")]
    Application { status: StatusCode, detail: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] reqwest::Error),

    #[error("Invalid request payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the failure ended the session and the user has to log in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Gateway(GatewayError::SessionExpired))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
