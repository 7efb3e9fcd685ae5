use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use schedule_cell::models::{AvailabilityWindow, BookableSlot};
use shared_models::time::clinic_datetime;

// ==============================================================================
// FLOW STATES
// ==============================================================================

/// The booking flow's state machine. One value per session; every transition
/// goes through [`crate::services::flow::BookingFlow`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FlowState {
    /// No date chosen yet.
    Idle,
    /// Date accepted, availability fetch in flight.
    Loading { date: NaiveDate },
    /// The provider has no availability on the chosen date.
    NoSlots { date: NaiveDate },
    /// The availability lookup failed; a new date selection retries.
    FetchFailed { date: NaiveDate },
    /// Slots derived and pickable.
    SlotsReady {
        date: NaiveDate,
        slots: Vec<BookableSlot>,
    },
    /// A slot is picked and the booking form is open.
    FormOpen {
        date: NaiveDate,
        slots: Vec<BookableSlot>,
        slot: BookableSlot,
        note: Option<String>,
    },
    /// Submission in flight; re-submission is disabled.
    Submitting {
        date: NaiveDate,
        slots: Vec<BookableSlot>,
        slot: BookableSlot,
        note: Option<String>,
    },
    /// Server confirmed the booking; waiting for the payment handoff.
    AwaitingPayment { record: BookingRecord, amount: i64 },
    /// Terminal: the gateway redirect is scheduled.
    PaymentRedirected {
        url: String,
        redirect_at: DateTime<Utc>,
    },
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::Loading { .. } => "loading",
            FlowState::NoSlots { .. } => "no_slots",
            FlowState::FetchFailed { .. } => "fetch_failed",
            FlowState::SlotsReady { .. } => "slots_ready",
            FlowState::FormOpen { .. } => "form_open",
            FlowState::Submitting { .. } => "submitting",
            FlowState::AwaitingPayment { .. } => "awaiting_payment",
            FlowState::PaymentRedirected { .. } => "payment_redirected",
        }
    }
}

// ==============================================================================
// NOTICES AND EFFECTS
// ==============================================================================

/// User-facing message owned by the state machine. Transient notices expire
/// on their own; blocking alerts persist until acknowledged.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Transient {
        text: String,
        expires_at: DateTime<Utc>,
    },
    Blocking {
        text: String,
    },
}

/// Observable side effect of a transition, surfaced to the caller instead of
/// being performed here (the UI scrolls, the browser redirects).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum FlowEffect {
    None,
    FocusForm,
    RedirectScheduled {
        url: String,
        at: DateTime<Utc>,
    },
}

/// Serializable view of a session returned by every flow operation.
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub session_id: Uuid,
    pub state: FlowState,
    pub notice: Option<Notice>,
    pub effect: FlowEffect,
}

// ==============================================================================
// WIRE MODELS
// ==============================================================================

/// Server-confirmed appointment, echoed back after submission. Immutable
/// once created; only its payment status changes, and that happens on the
/// gateway's side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    #[serde(rename = "start_date", with = "clinic_datetime")]
    pub start: NaiveDateTime,
    #[serde(rename = "end_date", with = "clinic_datetime")]
    pub end: NaiveDateTime,
}

/// Wire shape of the clinic API's booking endpoint. Field casing is the
/// server's, mixed as it is.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitAppointmentRequest {
    #[serde(rename = "providerId")]
    pub provider_id: Uuid,
    #[serde(rename = "serviceId")]
    pub service_id: Uuid,
    #[serde(rename = "patientId")]
    pub patient_id: String,
    #[serde(with = "clinic_datetime")]
    pub start_date: NaiveDateTime,
    #[serde(with = "clinic_datetime")]
    pub end_date: NaiveDateTime,
    pub description: String,
    pub attachments: Vec<Value>,
}

/// Price data from the service catalog, minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePrice {
    pub price: i64,
    pub discount_price: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub url: Option<String>,
}

// ==============================================================================
// FETCH COORDINATION
// ==============================================================================

/// Handle for an in-flight availability fetch. The generation number is how
/// stale responses are recognized: only the ticket matching the flow's
/// current generation may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Windows(Vec<AvailabilityWindow>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Applied,
    Stale,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, Error)]
pub enum BookingError {
    #[error("Selected date is in the past")]
    PastDate,

    #[error("Unrecognized date value: {0}")]
    InvalidDate(String),

    #[error("Cannot {action} from the {state} state")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    #[error("Selected time is not in the current availability list")]
    UnknownSlot,

    #[error("Sign in as a patient to book an appointment")]
    NotAuthorized,

    #[error("Booking session not found")]
    SessionNotFound,

    #[error("Availability lookup failed: {0}")]
    FetchFailed(String),

    #[error("Booking submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Payment request failed: {0}")]
    PaymentFailed(String),
}
