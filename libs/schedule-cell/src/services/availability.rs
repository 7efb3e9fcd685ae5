use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_gateway::ClinicApiClient;

use crate::models::{AvailabilityWindow, BookableSlot, ScheduleError};
use crate::services::discretizer;

/// Fetches a provider's coarse availability windows from the clinic API and
/// derives the bookable slots for a date.
pub struct AvailabilityService {
    gateway: Arc<ClinicApiClient>,
    default_duration_minutes: i64,
}

impl AvailabilityService {
    pub fn new(gateway: Arc<ClinicApiClient>, default_duration_minutes: i64) -> Self {
        Self {
            gateway,
            default_duration_minutes,
        }
    }

    /// Fetch the windows for (provider, service, date). An empty response
    /// means no availability, not an error. Malformed windows are dropped.
    pub async fn fetch_windows(
        &self,
        provider_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilityWindow>, ScheduleError> {
        debug!("Fetching availability for provider {} on {}", provider_id, date);

        let path = format!(
            "/providers/{}/availability?service_id={}&date={}",
            provider_id,
            service_id,
            urlencoding::encode(&date.to_string()),
        );

        let windows: Vec<AvailabilityWindow> = self
            .gateway
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ScheduleError::FetchFailed(e.to_string()))?;

        let windows: Vec<AvailabilityWindow> = windows
            .into_iter()
            .filter(|window| {
                if window.is_well_formed() {
                    true
                } else {
                    warn!(
                        "Discarding malformed availability window {} - {}",
                        window.start, window.end
                    );
                    false
                }
            })
            .collect();

        debug!("Provider {} has {} usable windows on {}", provider_id, windows.len(), date);
        Ok(windows)
    }

    /// Derive the slot list for a fetch result.
    pub fn discretize(&self, windows: &[AvailabilityWindow], date: NaiveDate) -> Vec<BookableSlot> {
        let duration =
            discretizer::service_duration_or_default(windows, self.default_duration_minutes);
        discretizer::derive_slots(windows, duration, date)
    }

    /// Fetch and discretize in one step.
    pub async fn slots_for_date(
        &self,
        provider_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookableSlot>, ScheduleError> {
        let windows = self.fetch_windows(provider_id, service_id, date).await?;
        Ok(self.discretize(&windows, date))
    }
}
