// AvailabilityService against a mocked clinic API.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::AvailabilityService;
use shared_config::AppConfig;
use shared_gateway::ClinicApiClient;

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        clinic_api_url: server.uri(),
        clinic_api_key: "test-key".to_string(),
        payment_gateway_url: String::new(),
        jwt_secret: "test-secret".to_string(),
        default_service_duration_minutes: 60,
        default_visit_amount: 500_000,
    }
}

fn service_for(server: &MockServer) -> AvailabilityService {
    let config = config_for(server);
    AvailabilityService::new(Arc::new(ClinicApiClient::new(&config)), 60)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

#[tokio::test]
async fn windows_become_slots() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();
    let service_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/availability", provider_id)))
        .and(query_param("service_id", service_id.to_string()))
        .and(query_param("date", "2025-03-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "start_time": "2025-03-10 09:00:00",
                "end_time": "2025-03-10 11:00:00",
                "services": [{"time": 30}]
            },
            {
                "start_time": "2025-03-10 14:00:00",
                "end_time": "2025-03-10 15:30:00",
                "services": [{"time": 30}]
            }
        ])))
        .mount(&server)
        .await;

    let slots = service_for(&server)
        .slots_for_date(provider_id, service_id, date())
        .await
        .unwrap();

    assert_eq!(slots.len(), 7);
    assert_eq!(slots[0].display_label, "09:00 - 09:30");
    assert_eq!(slots[6].display_label, "15:00 - 15:30");
}

#[tokio::test]
async fn empty_response_means_no_availability() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/availability", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let slots = service_for(&server)
        .slots_for_date(provider_id, Uuid::new_v4(), date())
        .await
        .unwrap();

    assert!(slots.is_empty());
}

#[tokio::test]
async fn malformed_windows_are_dropped() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    // Second window ends before it starts and must be ignored.
    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/availability", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "start_time": "2025-03-10 09:00:00",
                "end_time": "2025-03-10 10:00:00",
                "services": [{"time": 60}]
            },
            {
                "start_time": "2025-03-10 16:00:00",
                "end_time": "2025-03-10 15:00:00",
                "services": [{"time": 60}]
            }
        ])))
        .mount(&server)
        .await;

    let slots = service_for(&server)
        .slots_for_date(provider_id, Uuid::new_v4(), date())
        .await
        .unwrap();

    assert_eq!(slots.len(), 1);
}

#[tokio::test]
async fn missing_service_duration_defaults_to_an_hour() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/availability", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "start_time": "2025-03-10 09:30:00",
                "end_time": "2025-03-10 17:00:00",
                "services": []
            }
        ])))
        .mount(&server)
        .await;

    let slots = service_for(&server)
        .slots_for_date(provider_id, Uuid::new_v4(), date())
        .await
        .unwrap();

    assert_eq!(slots.len(), 7);
    assert_eq!(slots[6].display_label, "15:30 - 16:30");
}

#[tokio::test]
async fn server_errors_surface_as_fetch_failures() {
    let server = MockServer::start().await;
    let provider_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/availability", provider_id)))
        .respond_with(ResponseTemplate::new(500).set_body_string("availability backend down"))
        .mount(&server)
        .await;

    let result = service_for(&server)
        .slots_for_date(provider_id, Uuid::new_v4(), date())
        .await;

    assert!(result.is_err());
}
