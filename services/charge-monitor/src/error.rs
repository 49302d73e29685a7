//! API error kinds and their HTTP mapping
//!
//! Every failure a handler can produce ends up here. The response body is
//! always `{"error": {"type": ..., "message": ...}}`; `TokenExpired` adds
//! `"reauthenticate": true` so clients can restart the OAuth flow instead
//! of showing a generic error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    ValidationFailed(String),

    #[error("failed to authenticate with Tesla: {0}")]
    AuthExchangeFailed(String),

    #[error("not authenticated")]
    Unauthenticated,

    #[error("Tesla access token expired, re-authentication required")]
    TokenExpired,

    #[error("no vehicles found on this account")]
    NoVehiclesFound,

    #[error("charge data unavailable, the vehicle may be asleep")]
    ChargeDataUnavailable,

    #[error("failed to get vehicle status: {0}")]
    StatusFetchFailed(String),

    #[error("schedule {0} not found")]
    ScheduleNotFound(u64),
}

/// Result alias using the API Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ValidationFailed(_) | Error::AuthExchangeFailed(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated | Error::TokenExpired => StatusCode::UNAUTHORIZED,
            Error::NoVehiclesFound | Error::ScheduleNotFound(_) => StatusCode::NOT_FOUND,
            Error::ChargeDataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::StatusFetchFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Machine-readable `type` field of the error body.
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::ValidationFailed(_) => "validation_failed",
            Error::AuthExchangeFailed(_) => "auth_exchange_failed",
            Error::Unauthenticated => "unauthenticated",
            Error::TokenExpired => "token_expired",
            Error::NoVehiclesFound => "no_vehicles_found",
            Error::ChargeDataUnavailable => "charge_data_unavailable",
            Error::StatusFetchFailed(_) => "status_fetch_failed",
            Error::ScheduleNotFound(_) => "schedule_not_found",
        }
    }
}

impl From<tesla_api::Error> for Error {
    fn from(err: tesla_api::Error) -> Self {
        match err {
            tesla_api::Error::Unauthenticated => Error::Unauthenticated,
            tesla_api::Error::TokenExpired => Error::TokenExpired,
            tesla_api::Error::NoVehiclesFound => Error::NoVehiclesFound,
            tesla_api::Error::ChargeDataUnavailable => Error::ChargeDataUnavailable,
            tesla_api::Error::StatusFetchFailed(msg) => Error::StatusFetchFailed(msg),
        }
    }
}

impl From<tesla_auth::Error> for Error {
    fn from(err: tesla_auth::Error) -> Self {
        Error::AuthExchangeFailed(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, status = status.as_u16(), "request failed");
        }

        let mut error = serde_json::json!({
            "type": self.error_type(),
            "message": self.to_string(),
        });
        if matches!(self, Error::TokenExpired) {
            error["reauthenticate"] = serde_json::Value::Bool(true);
        }

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            serde_json::json!({ "error": error }).to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: Error) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::ValidationFailed("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::AuthExchangeFailed("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::ScheduleNotFound(3).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::NoVehiclesFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::ChargeDataUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::StatusFetchFailed("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn token_expired_body_carries_reauthenticate_marker() {
        let (status, json) = body_json(Error::TokenExpired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["type"], "token_expired");
        assert_eq!(json["error"]["reauthenticate"], true);
    }

    #[tokio::test]
    async fn unauthenticated_body_has_no_reauthenticate_marker() {
        let (status, json) = body_json(Error::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["type"], "unauthenticated");
        assert!(json["error"].get("reauthenticate").is_none());
    }

    #[tokio::test]
    async fn schedule_not_found_message_names_id() {
        let (_, json) = body_json(Error::ScheduleNotFound(42)).await;
        assert_eq!(json["error"]["type"], "schedule_not_found");
        assert_eq!(json["error"]["message"], "schedule 42 not found");
    }

    #[test]
    fn owner_api_errors_convert_kind_for_kind() {
        assert!(matches!(
            Error::from(tesla_api::Error::TokenExpired),
            Error::TokenExpired
        ));
        assert!(matches!(
            Error::from(tesla_api::Error::ChargeDataUnavailable),
            Error::ChargeDataUnavailable
        ));
        match Error::from(tesla_api::Error::StatusFetchFailed("boom".into())) {
            Error::StatusFetchFailed(msg) => assert_eq!(msg, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn auth_errors_become_auth_exchange_failed() {
        let err = Error::from(tesla_auth::Error::Http("connection refused".into()));
        assert!(matches!(err, Error::AuthExchangeFailed(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
