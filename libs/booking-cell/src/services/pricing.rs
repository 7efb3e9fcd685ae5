use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_gateway::ClinicApiClient;

use crate::models::ServicePrice;

/// Looks up current service prices and applies the payment amount rule.
pub struct PricingService {
    gateway: Arc<ClinicApiClient>,
}

impl PricingService {
    pub fn new(gateway: Arc<ClinicApiClient>) -> Self {
        Self { gateway }
    }

    /// Current price data for a service. Absent or unreadable price data is
    /// not an error here - the amount rule falls back to the configured
    /// default, matching how the booking flow degrades.
    pub async fn current_price(&self, service_id: Uuid) -> Option<ServicePrice> {
        let path = format!("/services/{}", service_id);

        match self
            .gateway
            .request::<ServicePrice>(Method::GET, &path, None, None)
            .await
        {
            Ok(price) => {
                debug!("Service {} priced at {} ({:?} discounted)", service_id, price.price, price.discount_price);
                Some(price)
            }
            Err(e) => {
                warn!("No price data for service {}: {}", service_id, e);
                None
            }
        }
    }

    /// The amount to charge: the discount price when it is set, positive and
    /// actually lower than the base price; the base price otherwise; the
    /// configured fallback when price data is entirely absent.
    pub fn payment_amount(price: Option<&ServicePrice>, fallback: i64) -> i64 {
        match price {
            Some(service) => match service.discount_price {
                Some(discount) if discount > 0 && discount < service.price => discount,
                _ => service.price,
            },
            None => fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(base: i64, discount: Option<i64>) -> ServicePrice {
        ServicePrice {
            price: base,
            discount_price: discount,
        }
    }

    #[test]
    fn discount_wins_when_lower_than_base() {
        let p = price(100_000, Some(80_000));
        assert_eq!(PricingService::payment_amount(Some(&p), 500_000), 80_000);
    }

    #[test]
    fn zero_discount_is_ignored() {
        let p = price(100_000, Some(0));
        assert_eq!(PricingService::payment_amount(Some(&p), 500_000), 100_000);
    }

    #[test]
    fn discount_above_base_is_ignored() {
        // Malformed catalog data: a "discount" higher than the base price.
        let p = price(100_000, Some(120_000));
        assert_eq!(PricingService::payment_amount(Some(&p), 500_000), 100_000);
    }

    #[test]
    fn missing_discount_charges_base() {
        let p = price(100_000, None);
        assert_eq!(PricingService::payment_amount(Some(&p), 500_000), 100_000);
    }

    #[test]
    fn absent_price_data_falls_back() {
        assert_eq!(PricingService::payment_amount(None, 500_000), 500_000);
    }
}
