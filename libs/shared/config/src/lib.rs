use std::env;
use tracing::warn;

/// Default length of a bookable appointment when the clinic API omits the
/// service duration from an availability response.
pub const DEFAULT_SERVICE_DURATION_MINUTES: i64 = 60;

/// Amount charged (in minor currency units) when neither a service record nor
/// price data is available at submission time.
pub const DEFAULT_VISIT_AMOUNT: i64 = 500_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub clinic_api_url: String,
    pub clinic_api_key: String,
    pub payment_gateway_url: String,
    pub jwt_secret: String,
    pub default_service_duration_minutes: i64,
    pub default_visit_amount: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            clinic_api_url: env::var("CLINIC_API_URL")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_URL not set, using empty value");
                    String::new()
                }),
            clinic_api_key: env::var("CLINIC_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("CLINIC_API_KEY not set, using empty value");
                    String::new()
                }),
            payment_gateway_url: env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("PAYMENT_GATEWAY_URL not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            default_service_duration_minutes: env::var("DEFAULT_SERVICE_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVICE_DURATION_MINUTES),
            default_visit_amount: env::var("DEFAULT_VISIT_AMOUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_VISIT_AMOUNT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.clinic_api_url.is_empty()
            && !self.clinic_api_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_payment_configured(&self) -> bool {
        !self.payment_gateway_url.is_empty()
    }
}
