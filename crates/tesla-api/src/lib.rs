//! Tesla owner API client
//!
//! Fetches the charge state of the account's vehicle and maps it to the
//! `VehicleStatus` shape served by the charge monitor. Only the first vehicle
//! on the account is ever consulted.

pub mod client;
pub mod error;
pub mod types;

pub use client::{OWNER_API_BASE_URL, VehicleClient};
pub use error::{Error, Result};
pub use types::{ChargeState, Vehicle, VehicleStatus};
