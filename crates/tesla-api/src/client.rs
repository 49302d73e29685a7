//! Vehicle status client
//!
//! Two owner API round-trips per status request:
//! 1. `GET /vehicles` to find the account's vehicle
//! 2. `GET /vehicles/{id}/vehicle_data` for its telemetry
//!
//! A 401 on either call is reported as `TokenExpired`. No retries; the
//! `reqwest::Client` passed in carries the request timeout.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::types::{Envelope, Vehicle, VehicleData, VehicleStatus};

/// Production owner API base URL
pub const OWNER_API_BASE_URL: &str = "https://owner-api.teslamotors.com/api/1";

/// Client for the owner API endpoints the charge monitor reads.
#[derive(Debug, Clone)]
pub struct VehicleClient {
    http: reqwest::Client,
    base_url: String,
}

impl VehicleClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the charge status of the account's first vehicle.
    ///
    /// Fails with `Unauthenticated` before any network I/O when no token is
    /// supplied.
    #[instrument(skip_all)]
    pub async fn get_vehicle_status(&self, access_token: Option<&str>) -> Result<VehicleStatus> {
        let token = match access_token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(Error::Unauthenticated),
        };

        let vehicles = self.list_vehicles(token).await?;
        // Multi-vehicle accounts are not supported: always the first one.
        let vehicle = vehicles.into_iter().next().ok_or(Error::NoVehiclesFound)?;
        debug!(vehicle_id = vehicle.id, "fetching vehicle data");

        let url = format!("{}/vehicles/{}/vehicle_data", self.base_url, vehicle.id);
        let data: Envelope<VehicleData> = self.get_json(&url, token).await?;

        let charge = data
            .response
            .and_then(|d| d.charge_state)
            .ok_or(Error::ChargeDataUnavailable)?;

        Ok(charge.into())
    }

    /// List the vehicles on the account, in provider order.
    pub async fn list_vehicles(&self, access_token: &str) -> Result<Vec<Vehicle>> {
        let url = format!("{}/vehicles", self.base_url);
        let list: Envelope<Vec<Vehicle>> = self.get_json(&url, access_token).await?;
        Ok(list.response.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::StatusFetchFailed(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!(url, "owner API rejected access token");
            return Err(Error::TokenExpired);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::StatusFetchFailed(format!(
                "{url} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::StatusFetchFailed(format!("invalid response from {url}: {e}")))
    }
}
