use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{BookingError, PaymentResponse};

/// Payment gateway client. The gateway answers with a hosted payment page
/// URL; the actual charge and its status live entirely on the gateway's
/// side.
pub struct PaymentGatewayService {
    client: Client,
    base_url: String,
}

impl PaymentGatewayService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.payment_gateway_url.clone(),
        }
    }

    /// Request a payment for a confirmed appointment.
    /// POST /payments {amount, appointment_id}, bearer authenticated.
    pub async fn initiate(
        &self,
        amount: i64,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<PaymentResponse, BookingError> {
        if self.base_url.is_empty() {
            return Err(BookingError::PaymentFailed(
                "Payment gateway is not configured".to_string(),
            ));
        }

        info!("Requesting payment of {} for appointment {}", amount, appointment_id);

        let url = format!("{}/payments", self.base_url);
        let body = json!({
            "amount": amount,
            "appointment_id": appointment_id,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", auth_token))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| BookingError::PaymentFailed(e.to_string()))?;

        debug!("Payment gateway response: {} - {}", status, response_text);

        if !status.is_success() {
            error!("Payment request failed: {} - {}", status, response_text);
            return Err(BookingError::PaymentFailed(format!(
                "HTTP {}: {}",
                status, response_text
            )));
        }

        serde_json::from_str(&response_text)
            .map_err(|e| BookingError::PaymentFailed(format!("Unreadable gateway response: {}", e)))
    }
}
