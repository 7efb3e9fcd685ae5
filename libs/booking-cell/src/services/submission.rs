use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use shared_gateway::ClinicApiClient;

use crate::models::{BookingError, BookingRecord, SubmitAppointmentRequest};

/// Submits confirmed selections to the clinic API.
pub struct SubmissionService {
    gateway: Arc<ClinicApiClient>,
}

impl SubmissionService {
    pub fn new(gateway: Arc<ClinicApiClient>) -> Self {
        Self { gateway }
    }

    /// Book the appointment on the patient's behalf. The server assigns the
    /// appointment id and echoes the booked interval.
    pub async fn submit(
        &self,
        request: SubmitAppointmentRequest,
        auth_token: &str,
    ) -> Result<BookingRecord, BookingError> {
        info!(
            "Submitting appointment for patient {} at {}",
            request.patient_id, request.start_date
        );

        let body = serde_json::to_value(&request)
            .map_err(|e| BookingError::SubmissionFailed(e.to_string()))?;

        let record: BookingRecord = self
            .gateway
            .request(Method::POST, "/appointments", Some(auth_token), Some(body))
            .await
            .map_err(|e| BookingError::SubmissionFailed(e.to_string()))?;

        info!("Appointment {} created", record.id);
        Ok(record)
    }
}
