//! Owner API wire types and the served `VehicleStatus` shape

use serde::{Deserialize, Serialize};

/// Charge status returned to the charge monitor's clients.
///
/// Fetched fresh for every request; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatus {
    pub battery_level: u8,
    pub charging_state: String,
    /// Hours until the charge limit is reached
    pub time_to_full_charge: f64,
    pub charge_limit: u8,
}

/// One entry of `GET /vehicles`.
#[derive(Debug, Clone, Deserialize)]
pub struct Vehicle {
    pub id: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// `charge_state` sub-object of `GET /vehicles/{id}/vehicle_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeState {
    pub battery_level: u8,
    pub charging_state: String,
    pub time_to_full_charge: f64,
    pub charge_limit_soc: u8,
}

impl From<ChargeState> for VehicleStatus {
    fn from(charge: ChargeState) -> Self {
        Self {
            battery_level: charge.battery_level,
            charging_state: charge.charging_state,
            time_to_full_charge: charge.time_to_full_charge,
            charge_limit: charge.charge_limit_soc,
        }
    }
}

/// Owner API responses wrap their payload in a `response` field.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub response: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VehicleData {
    #[serde(default)]
    pub charge_state: Option<ChargeState>,
}
