//! Error types for owner API calls

/// Errors from fetching vehicle status.
///
/// `TokenExpired` is kept apart from `StatusFetchFailed` so callers can send
/// the user back through authorization instead of showing a generic error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("access token expired or revoked")]
    TokenExpired,

    #[error("no vehicles found on this account")]
    NoVehiclesFound,

    #[error("no charge state data available (vehicle may be asleep)")]
    ChargeDataUnavailable,

    #[error("failed to fetch vehicle status: {0}")]
    StatusFetchFailed(String),
}

impl Error {
    /// Whether the caller should re-run the authorization flow.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Error::TokenExpired)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "unauthenticated",
            Error::TokenExpired => "token_expired",
            Error::NoVehiclesFound => "no_vehicles_found",
            Error::ChargeDataUnavailable => "charge_data_unavailable",
            Error::StatusFetchFailed(_) => "status_fetch_failed",
        }
    }
}

/// Result alias for owner API operations.
pub type Result<T> = std::result::Result<T, Error>;
