//! Charging schedule store
//!
//! In-memory table of schedule records keyed by id. Ids start at 1 and only
//! ever increase, so a deleted id is never handed out again while the
//! process lives. Schedules are inert: nothing here talks to the vehicle.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// A stored charging schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedule {
    pub id: u64,
    /// `HH:mm`
    pub start_time: String,
    /// `HH:mm`
    pub end_time: String,
    pub target_percentage: u8,
    /// 0 or 1
    pub enabled: u8,
}

/// Create payload. `enabled` defaults to 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub start_time: String,
    pub end_time: String,
    pub target_percentage: i64,
    #[serde(default = "default_enabled")]
    pub enabled: i64,
}

fn default_enabled() -> i64 {
    1
}

/// Partial update payload. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub target_percentage: Option<i64>,
    pub enabled: Option<i64>,
}

impl NewSchedule {
    fn validate(&self) -> Result<()> {
        validate_time("startTime", &self.start_time)?;
        validate_time("endTime", &self.end_time)?;
        validate_percentage(self.target_percentage)?;
        validate_enabled(self.enabled)?;
        Ok(())
    }
}

impl SchedulePatch {
    fn validate(&self) -> Result<()> {
        if let Some(t) = &self.start_time {
            validate_time("startTime", t)?;
        }
        if let Some(t) = &self.end_time {
            validate_time("endTime", t)?;
        }
        if let Some(p) = self.target_percentage {
            validate_percentage(p)?;
        }
        if let Some(e) = self.enabled {
            validate_enabled(e)?;
        }
        Ok(())
    }
}

/// `HH:mm`, 24-hour clock.
fn is_valid_time(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hours = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minutes = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hours < 24 && minutes < 60
}

fn validate_time(field: &str, value: &str) -> Result<()> {
    if is_valid_time(value) {
        Ok(())
    } else {
        Err(Error::ValidationFailed(format!(
            "{field} must be HH:mm, got {value:?}"
        )))
    }
}

fn validate_percentage(value: i64) -> Result<()> {
    if (0..=100).contains(&value) {
        Ok(())
    } else {
        Err(Error::ValidationFailed(format!(
            "targetPercentage must be between 0 and 100, got {value}"
        )))
    }
}

fn validate_enabled(value: i64) -> Result<()> {
    if value == 0 || value == 1 {
        Ok(())
    } else {
        Err(Error::ValidationFailed(format!(
            "enabled must be 0 or 1, got {value}"
        )))
    }
}

struct ScheduleTable {
    next_id: u64,
    rows: BTreeMap<u64, ChargingSchedule>,
}

/// Thread-safe schedule table shared by the request handlers.
pub struct ScheduleStore {
    state: Mutex<ScheduleTable>,
}

impl Default for ScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScheduleTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// All schedules ordered by id.
    pub async fn list(&self) -> Vec<ChargingSchedule> {
        let state = self.state.lock().await;
        state.rows.values().cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Result<ChargingSchedule> {
        let state = self.state.lock().await;
        state.rows.get(&id).cloned().ok_or(Error::ScheduleNotFound(id))
    }

    /// Validate and insert a schedule under a fresh id. A rejected payload
    /// does not consume an id.
    pub async fn create(&self, new: NewSchedule) -> Result<ChargingSchedule> {
        new.validate()?;

        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let schedule = ChargingSchedule {
            id,
            start_time: new.start_time,
            end_time: new.end_time,
            target_percentage: new.target_percentage as u8,
            enabled: new.enabled as u8,
        };
        state.rows.insert(id, schedule.clone());
        debug!(id, "created schedule");
        Ok(schedule)
    }

    /// Apply the fields present in `patch` to an existing schedule.
    pub async fn update(&self, id: u64, patch: SchedulePatch) -> Result<ChargingSchedule> {
        patch.validate()?;

        let mut state = self.state.lock().await;
        let schedule = state
            .rows
            .get_mut(&id)
            .ok_or(Error::ScheduleNotFound(id))?;

        if let Some(t) = patch.start_time {
            schedule.start_time = t;
        }
        if let Some(t) = patch.end_time {
            schedule.end_time = t;
        }
        if let Some(p) = patch.target_percentage {
            schedule.target_percentage = p as u8;
        }
        if let Some(e) = patch.enabled {
            schedule.enabled = e as u8;
        }
        debug!(id, "updated schedule");
        Ok(schedule.clone())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .rows
            .remove(&id)
            .map(|_| debug!(id, "deleted schedule"))
            .ok_or(Error::ScheduleNotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }
}
