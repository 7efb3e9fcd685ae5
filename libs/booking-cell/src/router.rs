use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, BookingState};

/// Session-scoped booking flow routes. Everything here requires a valid
/// bearer token; the submit transition additionally requires the patient
/// role, which the flow itself enforces.
pub fn booking_routes(state: BookingState) -> Router {
    let protected_routes = Router::new()
        .route("/sessions", post(handlers::open_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route("/sessions/{session_id}/date", post(handlers::select_date))
        .route("/sessions/{session_id}/slot", post(handlers::select_slot))
        .route("/sessions/{session_id}/submit", post(handlers::submit_booking))
        .route("/sessions/{session_id}/pay", post(handlers::initiate_payment))
        .route("/sessions/{session_id}/alert/ack", post(handlers::acknowledge_alert))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
