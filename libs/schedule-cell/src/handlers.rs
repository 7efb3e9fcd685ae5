use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::ScheduleError;
use crate::services::availability::AvailabilityService;
use crate::services::calendar;

#[derive(Clone)]
pub struct ScheduleState {
    pub availability: Arc<AvailabilityService>,
}

#[derive(Debug, Deserialize)]
pub struct SlotPreviewParams {
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub date: String,
}

/// Stateless slot preview - the day-strip entry point. Runs the same date
/// guard as the booking session's date selection.
pub async fn preview_slots(
    State(state): State<ScheduleState>,
    Query(params): Query<SlotPreviewParams>,
) -> Result<Json<Value>, AppError> {
    let date = calendar::parse_selected_date(&Value::String(params.date.clone()))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if calendar::is_past_date(date, calendar::today_local()) {
        return Err(AppError::BadRequest(ScheduleError::PastDate.to_string()));
    }

    let slots = state
        .availability
        .slots_for_date(params.provider_id, params.service_id, date)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({
        "date": date.to_string(),
        "count": slots.len(),
        "slots": slots,
    })))
}
