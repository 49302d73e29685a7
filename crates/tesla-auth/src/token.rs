//! OAuth authorization code exchange
//!
//! POSTs the authorization code and PKCE verifier to the Tesla token
//! endpoint as JSON. There is no refresh path: when the access token
//! stops working the user re-runs the authorization flow.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::settings::OAuthSettings;

/// Successful token endpoint response.
///
/// `expires_in` is a delta in seconds from the response time.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    code: &'a str,
    code_verifier: &'a str,
    redirect_uri: &'a str,
}

/// Exchange an authorization code for tokens.
///
/// The verifier must be the one whose challenge went out in the
/// authorization URL. Callers drop it after this returns, whatever the
/// outcome.
pub async fn exchange_code(
    client: &reqwest::Client,
    settings: &OAuthSettings,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse> {
    let body = ExchangeRequest {
        grant_type: "authorization_code",
        client_id: &settings.client_id,
        code,
        code_verifier: verifier,
        redirect_uri: &settings.redirect_uri,
    };

    debug!(endpoint = %settings.token_endpoint, "exchanging authorization code");

    let response = client
        .post(&settings.token_endpoint)
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        warn!(%status, "token endpoint rejected authorization code");
        return Err(Error::AuthExchangeFailed(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::AuthExchangeFailed(format!("invalid token response: {e}")))
}
