use std::sync::Arc;

use axum::{routing::get, Router};

use booking_cell::handlers::BookingState;
use booking_cell::router::booking_routes;
use booking_cell::BookingFlowService;
use schedule_cell::handlers::ScheduleState;
use schedule_cell::router::schedule_routes;
use schedule_cell::AvailabilityService;
use shared_config::AppConfig;
use shared_gateway::ClinicApiClient;

pub fn create_router(config: Arc<AppConfig>) -> Router {
    let gateway = Arc::new(ClinicApiClient::new(&config));

    let schedule_state = ScheduleState {
        availability: Arc::new(AvailabilityService::new(
            Arc::clone(&gateway),
            config.default_service_duration_minutes,
        )),
    };

    let booking_state = BookingState {
        config: Arc::clone(&config),
        flows: Arc::new(BookingFlowService::new(&config)),
    };

    Router::new()
        .route("/", get(|| async { "Booking API is running!" }))
        .nest("/schedule", schedule_routes(schedule_state))
        .nest("/booking", booking_routes(booking_state))
}
