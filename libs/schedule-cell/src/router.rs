use axum::{routing::get, Router};

use crate::handlers::{self, ScheduleState};

/// Slot browsing is public - patients look at availability before they have
/// a session or a token.
pub fn schedule_routes(state: ScheduleState) -> Router {
    Router::new()
        .route("/slots", get(handlers::preview_slots))
        .with_state(state)
}
