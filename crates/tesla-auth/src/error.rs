//! Error types for OAuth authentication operations

/// Errors from the token endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    AuthExchangeFailed(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
