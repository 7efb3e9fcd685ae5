use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::time::clinic_datetime;

// ==============================================================================
// AVAILABILITY MODELS
// ==============================================================================

/// Coarse interval during which a provider is nominally bookable on one day.
/// Produced fresh per (provider, service, date) fetch and discarded after
/// slot derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    #[serde(rename = "start_time", with = "clinic_datetime")]
    pub start: NaiveDateTime,
    #[serde(rename = "end_time", with = "clinic_datetime")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub services: Vec<WindowService>,
}

impl AvailabilityWindow {
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Service duration advertised on this window, if any.
    pub fn service_duration_minutes(&self) -> Option<i64> {
        self.services.first().map(|s| s.duration_minutes)
    }
}

/// Service entry attached to an availability window. The clinic API sends
/// more fields than this; only the duration participates in slot derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowService {
    #[serde(rename = "time")]
    pub duration_minutes: i64,
}

/// Discrete, reservable unit derived from an [`AvailabilityWindow`].
/// `end - start` always equals the service duration exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableSlot {
    #[serde(with = "clinic_datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "clinic_datetime")]
    pub end: NaiveDateTime,
    pub display_label: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    #[error("Selected date is in the past")]
    PastDate,

    #[error("Unrecognized date value: {0}")]
    InvalidDate(String),

    #[error("Availability lookup failed: {0}")]
    FetchFailed(String),
}
