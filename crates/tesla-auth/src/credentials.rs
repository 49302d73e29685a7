//! In-memory credential storage
//!
//! Holds the single most recent token set. Saving replaces the previous
//! credential wholesale. A tokio Mutex serializes access from concurrent
//! request handlers; reads clone the credential out so the lock is held
//! only briefly.
//!
//! Expiry is recorded but never enforced here. A stale access token shows
//! up as a 401 from the owner API, which the status client reports as
//! `TokenExpired`.

use std::time::{SystemTime, UNIX_EPOCH};

use common::Secret;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::token::TokenResponse;

/// OAuth credentials for the signed-in user.
///
/// `expires_at` is a unix timestamp in milliseconds (absolute, not a delta).
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    pub expires_at: u64,
}

impl Credential {
    /// Build a credential from a token response received at `now_millis`.
    pub fn from_token_response(token: TokenResponse, now_millis: u64) -> Self {
        Self {
            access_token: Secret::new(token.access_token),
            refresh_token: Secret::new(token.refresh_token),
            expires_at: now_millis.saturating_add(token.expires_in.saturating_mul(1000)),
        }
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Single-slot credential store.
#[derive(Debug, Default)]
pub struct CredentialStore {
    state: Mutex<Option<Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of the stored credential, if any.
    pub async fn get(&self) -> Option<Credential> {
        let state = self.state.lock().await;
        state.clone()
    }

    /// Replace the stored credential and return what was stored.
    pub async fn save(&self, credential: Credential) -> Credential {
        let mut state = self.state.lock().await;
        let replaced = state.replace(credential.clone()).is_some();
        info!(
            expires_at = credential.expires_at,
            replaced, "saved credentials"
        );
        credential
    }

    /// Remove the stored credential. Returns it if one existed.
    pub async fn clear(&self) -> Option<Credential> {
        let mut state = self.state.lock().await;
        let removed = state.take();
        if removed.is_some() {
            debug!("cleared credentials");
        }
        removed
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.is_some()
    }
}
