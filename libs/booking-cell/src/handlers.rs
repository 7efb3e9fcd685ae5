use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDateTime;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::time::clinic_datetime;

use crate::models::BookingError;
use crate::services::session::BookingFlowService;

#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub flows: Arc<BookingFlowService>,
}

// ==============================================================================
// REQUEST BODIES
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub provider_id: Uuid,
    pub service_id: Uuid,
}

/// The date arrives in whatever shape the client's picker produced; the
/// flow normalizes it.
#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: Value,
}

#[derive(Debug, Deserialize)]
pub struct SelectSlotRequest {
    #[serde(with = "clinic_datetime")]
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub note: Option<String>,
}

// ==============================================================================
// SESSION HANDLERS
// ==============================================================================

/// Open a booking flow session for (provider, service). The caller's
/// identity is captured here and gates submission later.
#[axum::debug_handler]
pub async fn open_session(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let identity = user.into_identity(auth.token());

    let session_id = state
        .flows
        .open_session(request.provider_id, request.service_id, identity)
        .await;

    Ok(Json(json!({
        "session_id": session_id,
    })))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .snapshot(session_id)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

#[axum::debug_handler]
pub async fn select_date(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectDateRequest>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .select_date(session_id, request.date)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

#[axum::debug_handler]
pub async fn select_slot(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SelectSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .select_slot(session_id, request.start_time)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

#[axum::debug_handler]
pub async fn submit_booking(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .submit(session_id, request.note)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

#[axum::debug_handler]
pub async fn initiate_payment(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .initiate_payment(session_id)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

#[axum::debug_handler]
pub async fn acknowledge_alert(
    State(state): State<BookingState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state
        .flows
        .acknowledge_alert(session_id)
        .await
        .map_err(map_flow_error)?;

    Ok(Json(json!({ "session": snapshot })))
}

fn map_flow_error(e: BookingError) -> AppError {
    match e {
        BookingError::PastDate | BookingError::InvalidDate(_) | BookingError::UnknownSlot => {
            AppError::BadRequest(e.to_string())
        }
        BookingError::InvalidTransition { .. } => AppError::Conflict(e.to_string()),
        BookingError::NotAuthorized => AppError::Auth(e.to_string()),
        BookingError::SessionNotFound => AppError::NotFound(e.to_string()),
        BookingError::FetchFailed(_)
        | BookingError::SubmissionFailed(_)
        | BookingError::PaymentFailed(_) => AppError::ExternalService(e.to_string()),
    }
}
