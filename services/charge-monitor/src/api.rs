//! JSON API for authentication, vehicle status, and charging schedules
//!
//! Endpoints:
//! - POST   /api/auth/tesla/init   start PKCE flow, return authorization URL
//! - POST   /api/auth/tesla        exchange code, store credentials
//! - GET    /api/auth/session      whether credentials are stored
//! - DELETE /api/auth/session      forget stored credentials
//! - GET    /api/vehicle/status    charge status of the account's vehicle
//! - GET    /api/schedules         list schedules
//! - POST   /api/schedules         create schedule
//! - GET    /api/schedules/{id}    fetch schedule
//! - PATCH  /api/schedules/{id}    partial update
//! - DELETE /api/schedules/{id}    delete schedule

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use tesla_api::{VehicleClient, VehicleStatus};
use tesla_auth::{Credential, CredentialStore, OAuthSettings};

use crate::error::{Error, Result};
use crate::metrics;
use crate::schedules::{ChargingSchedule, NewSchedule, SchedulePatch, ScheduleStore};

/// The one in-progress OAuth flow.
///
/// Created by init and consumed by the code exchange. Starting a new flow
/// replaces any earlier one.
struct PendingAuthorization {
    state: String,
    verifier: String,
    created_at: Instant,
}

/// How long a pending authorization stays usable.
const PKCE_EXPIRY: Duration = Duration::from_secs(600);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    credentials: Arc<CredentialStore>,
    schedules: Arc<ScheduleStore>,
    http_client: reqwest::Client,
    oauth: Arc<OAuthSettings>,
    vehicles: VehicleClient,
    pending: Arc<Mutex<Option<PendingAuthorization>>>,
}

impl ApiState {
    pub fn new(
        credentials: Arc<CredentialStore>,
        schedules: Arc<ScheduleStore>,
        http_client: reqwest::Client,
        oauth: OAuthSettings,
        api_base_url: &str,
    ) -> Self {
        Self {
            credentials,
            schedules,
            vehicles: VehicleClient::new(http_client.clone(), api_base_url),
            http_client,
            oauth: Arc::new(oauth),
            pending: Arc::new(Mutex::new(None)),
        }
    }
}

/// Build the API router.
pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/auth/tesla/init", post(init_auth))
        .route("/api/auth/tesla", post(complete_auth))
        .route("/api/auth/session", get(session).delete(logout))
        .route("/api/vehicle/status", get(vehicle_status))
        .route("/api/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/api/schedules/{id}",
            get(get_schedule)
                .patch(update_schedule)
                .delete(delete_schedule),
        )
        .with_state(state)
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(v)| v)
        .map_err(|e| Error::ValidationFailed(e.body_text()))
}

fn path_id(id: std::result::Result<Path<u64>, PathRejection>) -> Result<u64> {
    id.map(|Path(id)| id)
        .map_err(|e| Error::ValidationFailed(e.body_text()))
}

/// POST /api/auth/tesla/init: generate PKCE pair and return the authorization URL.
async fn init_auth(State(state): State<ApiState>) -> impl IntoResponse {
    let verifier = tesla_auth::generate_verifier();
    let challenge = tesla_auth::compute_challenge(&verifier);
    let oauth_state = tesla_auth::generate_state();
    let authorization_url =
        tesla_auth::build_authorization_url(&state.oauth, &oauth_state, &challenge);

    let replaced = state
        .pending
        .lock()
        .await
        .replace(PendingAuthorization {
            state: oauth_state.clone(),
            verifier,
            created_at: Instant::now(),
        })
        .is_some();

    info!(replaced, "PKCE flow initiated");

    Json(serde_json::json!({
        "authorization_url": authorization_url,
        "state": oauth_state,
    }))
}

#[derive(Deserialize)]
struct CompleteAuthRequest {
    code: String,
    state: String,
}

/// POST /api/auth/tesla: exchange the authorization code for tokens.
///
/// `state` must match the pending authorization; a mismatch leaves the
/// pending flow in place. Otherwise the verifier is taken out before the
/// exchange, so it is gone whether the exchange succeeds or not.
/// Credentials are stored only on success.
async fn complete_auth(
    State(state): State<ApiState>,
    body: std::result::Result<Json<CompleteAuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let body = json_body(body)?;
    if body.code.trim().is_empty() {
        return Err(Error::ValidationFailed("code must not be empty".into()));
    }

    let pending = {
        let mut slot = state.pending.lock().await;
        if slot.as_ref().is_some_and(|p| p.state != body.state) {
            warn!("authorization state mismatch");
            return Err(Error::ValidationFailed(
                "state does not match pending authorization".into(),
            ));
        }
        slot.take().ok_or_else(|| {
            Error::ValidationFailed("no pending authorization (expired or not initiated)".into())
        })?
    };

    if pending.created_at.elapsed() > PKCE_EXPIRY {
        return Err(Error::ValidationFailed(
            "authorization expired (>10 minutes), please start again".into(),
        ));
    }

    let token = tesla_auth::exchange_code(
        &state.http_client,
        &state.oauth,
        &body.code,
        &pending.verifier,
    )
    .await
    .inspect_err(|e| {
        warn!(error = %e, "token exchange failed");
        metrics::record_tesla_error("auth_exchange_failed");
    })?;

    let credential = Credential::from_token_response(token, tesla_auth::unix_millis());
    state.credentials.save(credential).await;
    metrics::set_authenticated(true);

    info!("Tesla authentication completed");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/auth/session: report whether credentials are stored. Never
/// exposes tokens.
async fn session(State(state): State<ApiState>) -> impl IntoResponse {
    let body = match state.credentials.get().await {
        Some(credential) => serde_json::json!({
            "authenticated": true,
            "expiresAt": credential.expires_at,
        }),
        None => serde_json::json!({ "authenticated": false }),
    };
    Json(body)
}

/// DELETE /api/auth/session: forget stored credentials.
async fn logout(State(state): State<ApiState>) -> StatusCode {
    if state.credentials.clear().await.is_some() {
        info!("credentials cleared");
    }
    metrics::set_authenticated(false);
    StatusCode::NO_CONTENT
}

/// GET /api/vehicle/status: fetch live charge status with the stored token.
async fn vehicle_status(State(state): State<ApiState>) -> Result<Json<VehicleStatus>> {
    let credential = state.credentials.get().await;
    let token = credential.as_ref().map(|c| c.access_token.expose().as_str());

    let status = state
        .vehicles
        .get_vehicle_status(token)
        .await
        .inspect_err(|e| {
            if !matches!(e, tesla_api::Error::Unauthenticated) {
                metrics::record_tesla_error(e.kind());
            }
            if e.is_token_expired() {
                warn!("stored access token rejected, re-authentication required");
                metrics::record_token_expired();
            }
        })?;

    Ok(Json(status))
}

/// GET /api/schedules
async fn list_schedules(State(state): State<ApiState>) -> Json<Vec<ChargingSchedule>> {
    Json(state.schedules.list().await)
}

/// POST /api/schedules
async fn create_schedule(
    State(state): State<ApiState>,
    body: std::result::Result<Json<NewSchedule>, JsonRejection>,
) -> Result<Json<ChargingSchedule>> {
    let new = json_body(body)?;
    let schedule = state.schedules.create(new).await?;
    info!(id = schedule.id, "schedule created");
    Ok(Json(schedule))
}

/// GET /api/schedules/{id}
async fn get_schedule(
    State(state): State<ApiState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<ChargingSchedule>> {
    let id = path_id(id)?;
    Ok(Json(state.schedules.get(id).await?))
}

/// PATCH /api/schedules/{id}
async fn update_schedule(
    State(state): State<ApiState>,
    id: std::result::Result<Path<u64>, PathRejection>,
    body: std::result::Result<Json<SchedulePatch>, JsonRejection>,
) -> Result<Json<ChargingSchedule>> {
    let id = path_id(id)?;
    let patch = json_body(body)?;
    Ok(Json(state.schedules.update(id, patch).await?))
}

/// DELETE /api/schedules/{id}
async fn delete_schedule(
    State(state): State<ApiState>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<StatusCode> {
    let id = path_id(id)?;
    state.schedules.delete(id).await?;
    info!(id, "schedule deleted");
    Ok(StatusCode::NO_CONTENT)
}
