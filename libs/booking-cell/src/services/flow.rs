use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::services::calendar::{is_past_date, parse_selected_date};
use schedule_cell::services::discretizer::{derive_slots, service_duration_or_default};
use shared_models::auth::{Identity, IdentityProvider};

use crate::models::{
    BookingError, BookingRecord, CompletionStatus, FetchOutcome, FetchTicket, FlowEffect,
    FlowState, Notice, PaymentResponse,
};

/// How long a transient notice stays visible.
pub const NOTICE_TTL_SECONDS: i64 = 3;

/// Fixed user-facing pause between a successful payment request and the
/// actual redirect.
pub const PAYMENT_REDIRECT_DELAY_SECONDS: i64 = 2;

/// Everything the driver needs to perform a submission outside the state
/// lock.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub note: Option<String>,
    pub identity: Identity,
}

/// Everything the driver needs to call the payment gateway.
#[derive(Debug, Clone)]
pub struct PaymentTicket {
    pub appointment_id: Uuid,
    pub token: String,
}

/// The booking state machine for one session: date selection, slot pick,
/// form, submission, payment handoff. Owns its notices and their timers;
/// all I/O happens outside, between the `begin_*` and `complete_*` halves of
/// each asynchronous transition.
pub struct BookingFlow {
    provider_id: Uuid,
    service_id: Uuid,
    default_duration_minutes: i64,
    identity: Arc<dyn IdentityProvider>,
    state: FlowState,
    notice: Option<Notice>,
    generation: u64,
}

impl BookingFlow {
    pub fn new(
        provider_id: Uuid,
        service_id: Uuid,
        default_duration_minutes: i64,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            provider_id,
            service_id,
            default_duration_minutes,
            identity,
            state: FlowState::Idle,
            notice: None,
            generation: 0,
        }
    }

    pub fn provider_id(&self) -> Uuid {
        self.provider_id
    }

    pub fn service_id(&self) -> Uuid {
        self.service_id
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Expire a transient notice that has outlived its window. Blocking
    /// alerts are untouched; they clear only via [`Self::acknowledge_alert`].
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(Notice::Transient { expires_at, .. }) = &self.notice {
            if now >= *expires_at {
                self.notice = None;
            }
        }
    }

    fn set_transient_notice(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.notice = Some(Notice::Transient {
            text: text.into(),
            expires_at: now + Duration::seconds(NOTICE_TTL_SECONDS),
        });
    }

    // --------------------------------------------------------------------------
    // Date selection
    // --------------------------------------------------------------------------

    /// Accept or reject a date pick. Valid from any state. Rejection leaves
    /// the state untouched and raises a transient notice; acceptance clears
    /// any selected slot and open form, bumps the fetch generation and moves
    /// to `Loading`. The caller runs the availability fetch and reports back
    /// through [`Self::complete_date_selection`].
    pub fn begin_date_selection(
        &mut self,
        raw: &Value,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<FetchTicket, BookingError> {
        let date = match parse_selected_date(raw) {
            Ok(date) => date,
            Err(e) => {
                self.set_transient_notice(e.to_string(), now);
                return Err(BookingError::InvalidDate(raw.to_string()));
            }
        };

        if is_past_date(date, today) {
            debug!("Rejecting past date {}", date);
            self.set_transient_notice("Cannot pick a date in the past", now);
            return Err(BookingError::PastDate);
        }

        self.generation += 1;
        self.state = FlowState::Loading { date };
        debug!("Date {} accepted, fetch generation {}", date, self.generation);

        Ok(FetchTicket {
            generation: self.generation,
            date,
        })
    }

    /// Apply a fetch outcome. Responses from superseded selections are
    /// discarded: only the ticket carrying the current generation wins, so a
    /// slow early fetch can never clobber a later one.
    pub fn complete_date_selection(
        &mut self,
        ticket: FetchTicket,
        outcome: FetchOutcome,
        now: DateTime<Utc>,
    ) -> CompletionStatus {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale availability response (generation {}, current {})",
                ticket.generation, self.generation
            );
            return CompletionStatus::Stale;
        }

        match outcome {
            FetchOutcome::Windows(windows) => {
                let duration =
                    service_duration_or_default(&windows, self.default_duration_minutes);
                let slots = derive_slots(&windows, duration, ticket.date);

                if slots.is_empty() {
                    debug!("No bookable slots for {}", ticket.date);
                    self.state = FlowState::NoSlots { date: ticket.date };
                } else {
                    debug!("{} slots ready for {}", slots.len(), ticket.date);
                    self.state = FlowState::SlotsReady {
                        date: ticket.date,
                        slots,
                    };
                }
            }
            FetchOutcome::Failed(message) => {
                warn!("Availability fetch failed for {}: {}", ticket.date, message);
                self.set_transient_notice(message, now);
                self.state = FlowState::FetchFailed { date: ticket.date };
            }
        }

        CompletionStatus::Applied
    }

    // --------------------------------------------------------------------------
    // Slot selection
    // --------------------------------------------------------------------------

    /// Pick a slot by its start time. Valid once slots are ready; picking
    /// again while the form is open replaces the slot and keeps the form
    /// open. The returned effect asks the caller to bring the form into
    /// view.
    pub fn select_slot(&mut self, slot_start: NaiveDateTime) -> Result<FlowEffect, BookingError> {
        let (date, slots, note) = match &self.state {
            FlowState::SlotsReady { date, slots } => (*date, slots.clone(), None),
            FlowState::FormOpen {
                date, slots, note, ..
            } => (*date, slots.clone(), note.clone()),
            other => {
                return Err(BookingError::InvalidTransition {
                    state: other.name(),
                    action: "select a time",
                })
            }
        };

        // The pick must come from the list derived for this date.
        let slot = slots
            .iter()
            .find(|s| s.start == slot_start)
            .cloned()
            .ok_or(BookingError::UnknownSlot)?;

        debug!("Slot {} selected", slot.display_label);
        self.state = FlowState::FormOpen {
            date,
            slots,
            slot,
            note,
        };

        Ok(FlowEffect::FocusForm)
    }

    // --------------------------------------------------------------------------
    // Submission
    // --------------------------------------------------------------------------

    /// Gate and stage a submission. Valid only while the form is open, and
    /// only for an authenticated patient. Moves to `Submitting`, which
    /// disables re-submission until the outcome lands.
    pub fn begin_submission(
        &mut self,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SubmissionTicket, BookingError> {
        let (date, slots, slot) = match &self.state {
            FlowState::FormOpen {
                date, slots, slot, ..
            } => (*date, slots.clone(), slot.clone()),
            other => {
                return Err(BookingError::InvalidTransition {
                    state: other.name(),
                    action: "submit",
                })
            }
        };

        let identity = match self.identity.current_identity() {
            Some(identity) if identity.can_book() => identity,
            _ => {
                self.set_transient_notice("Sign in as a patient to book an appointment", now);
                return Err(BookingError::NotAuthorized);
            }
        };

        self.state = FlowState::Submitting {
            date,
            slots,
            slot: slot.clone(),
            note: note.clone(),
        };

        Ok(SubmissionTicket {
            start: slot.start,
            end: slot.end,
            note,
            identity,
        })
    }

    /// Apply a submission outcome: success carries the confirmed record and
    /// the amount that will be requested; failure reopens the form with the
    /// note intact and raises a transient notice. No automatic retry.
    pub fn complete_submission(
        &mut self,
        outcome: Result<(BookingRecord, i64), String>,
        now: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        let (date, slots, slot, note) = match &self.state {
            FlowState::Submitting {
                date,
                slots,
                slot,
                note,
            } => (*date, slots.clone(), slot.clone(), note.clone()),
            other => {
                return Err(BookingError::InvalidTransition {
                    state: other.name(),
                    action: "complete a submission",
                })
            }
        };

        match outcome {
            Ok((record, amount)) => {
                info!("Appointment {} confirmed, amount {}", record.id, amount);
                self.state = FlowState::AwaitingPayment { record, amount };
            }
            Err(message) => {
                warn!("Submission failed: {}", message);
                self.set_transient_notice(message, now);
                self.state = FlowState::FormOpen {
                    date,
                    slots,
                    slot,
                    note,
                };
            }
        }

        Ok(())
    }

    // --------------------------------------------------------------------------
    // Payment
    // --------------------------------------------------------------------------

    /// Stage a payment request. Valid only while awaiting payment. The
    /// amount is deliberately not taken from the stored state: the driver
    /// recomputes it from current price data before calling the gateway.
    pub fn begin_payment(&mut self) -> Result<PaymentTicket, BookingError> {
        let record = match &self.state {
            FlowState::AwaitingPayment { record, .. } => record.clone(),
            other => {
                return Err(BookingError::InvalidTransition {
                    state: other.name(),
                    action: "start payment",
                })
            }
        };

        let identity = self
            .identity
            .current_identity()
            .ok_or(BookingError::NotAuthorized)?;

        Ok(PaymentTicket {
            appointment_id: record.id,
            token: identity.token,
        })
    }

    /// Apply the gateway's answer. A success with a URL schedules the
    /// redirect after the fixed processing pause. Anything else keeps the
    /// session in `AwaitingPayment` and raises a blocking alert - silently
    /// dropping a payment failure could leave the user believing they paid.
    pub fn complete_payment(
        &mut self,
        outcome: Result<PaymentResponse, String>,
        now: DateTime<Utc>,
    ) -> Result<FlowEffect, BookingError> {
        if !matches!(self.state, FlowState::AwaitingPayment { .. }) {
            return Err(BookingError::InvalidTransition {
                state: self.state.name(),
                action: "complete a payment",
            });
        }

        let failure = |flow: &mut Self, message: String| {
            warn!("Payment initiation failed: {}", message);
            flow.notice = Some(Notice::Blocking {
                text: "Payment could not be started. Please try again.".to_string(),
            });
            Err(BookingError::PaymentFailed(message))
        };

        match outcome {
            Ok(response) => match (response.success, response.url) {
                (true, Some(url)) => {
                    let redirect_at =
                        now + Duration::seconds(PAYMENT_REDIRECT_DELAY_SECONDS);
                    info!("Payment accepted, redirect scheduled for {}", redirect_at);
                    self.state = FlowState::PaymentRedirected {
                        url: url.clone(),
                        redirect_at,
                    };
                    Ok(FlowEffect::RedirectScheduled {
                        url,
                        at: redirect_at,
                    })
                }
                _ => failure(self, "Gateway returned no redirect URL".to_string()),
            },
            Err(message) => failure(self, message),
        }
    }

    /// Clear a blocking alert after the user has acknowledged it.
    pub fn acknowledge_alert(&mut self) -> bool {
        if matches!(self.notice, Some(Notice::Blocking { .. })) {
            self.notice = None;
            true
        } else {
            false
        }
    }
}
