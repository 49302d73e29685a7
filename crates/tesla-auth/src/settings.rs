//! Per-deployment OAuth client settings
//!
//! Defaults come from `constants`; the service overrides individual fields
//! from its config file (tests point the endpoints at local mock servers).

use crate::constants::{
    AUTHORIZE_ENDPOINT, REDIRECT_URI, SCOPES, TESLA_CLIENT_ID, TOKEN_ENDPOINT,
};

/// OAuth client identity and provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
    pub scopes: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: TESLA_CLIENT_ID.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            scopes: SCOPES.to_string(),
        }
    }
}
