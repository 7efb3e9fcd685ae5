use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use schedule_cell::AvailabilityService;
use shared_config::AppConfig;
use shared_gateway::ClinicApiClient;
use shared_models::auth::{CapturedIdentity, Identity};

use crate::models::{
    BookingError, CompletionStatus, FetchOutcome, FlowEffect, FlowSnapshot,
    SubmitAppointmentRequest,
};
use crate::services::clock::{Clock, SystemClock};
use crate::services::flow::BookingFlow;
use crate::services::payment::PaymentGatewayService;
use crate::services::pricing::PricingService;
use crate::services::submission::SubmissionService;

/// Owns every in-progress booking session and drives their flows against
/// the external collaborators. Each session is guarded by its own mutex;
/// network calls run outside that lock so sessions never block each other
/// and overlapping date picks within a session stay observable.
pub struct BookingFlowService {
    availability: AvailabilityService,
    submission: SubmissionService,
    pricing: PricingService,
    payment: PaymentGatewayService,
    clock: Arc<dyn Clock>,
    default_duration_minutes: i64,
    default_visit_amount: i64,
    flows: RwLock<HashMap<Uuid, Arc<Mutex<BookingFlow>>>>,
}

impl BookingFlowService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let gateway = Arc::new(ClinicApiClient::new(config));

        Self {
            availability: AvailabilityService::new(
                Arc::clone(&gateway),
                config.default_service_duration_minutes,
            ),
            submission: SubmissionService::new(Arc::clone(&gateway)),
            pricing: PricingService::new(Arc::clone(&gateway)),
            payment: PaymentGatewayService::new(config),
            clock,
            default_duration_minutes: config.default_service_duration_minutes,
            default_visit_amount: config.default_visit_amount,
            flows: RwLock::new(HashMap::new()),
        }
    }

    /// Open a session for (provider, service), capturing the caller's
    /// identity for the gated transitions later in the flow.
    pub async fn open_session(
        &self,
        provider_id: Uuid,
        service_id: Uuid,
        identity: Identity,
    ) -> Uuid {
        let session_id = Uuid::new_v4();
        let flow = BookingFlow::new(
            provider_id,
            service_id,
            self.default_duration_minutes,
            Arc::new(CapturedIdentity(identity)),
        );

        self.flows
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(flow)));

        info!("Opened booking session {} for provider {}", session_id, provider_id);
        session_id
    }

    async fn flow(&self, session_id: Uuid) -> Result<Arc<Mutex<BookingFlow>>, BookingError> {
        self.flows
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(BookingError::SessionNotFound)
    }

    fn snapshot_of(session_id: Uuid, flow: &BookingFlow, effect: FlowEffect) -> FlowSnapshot {
        FlowSnapshot {
            session_id,
            state: flow.state().clone(),
            notice: flow.notice().cloned(),
            effect,
        }
    }

    /// Observe a session, expiring any due transient notice first.
    pub async fn snapshot(&self, session_id: Uuid) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;
        let mut guard = flow.lock().await;
        guard.tick(self.clock.now());
        Ok(Self::snapshot_of(session_id, &guard, FlowEffect::None))
    }

    /// Select a date: guard, fetch availability, derive slots. The fetch
    /// runs outside the session lock; the flow's generation check decides
    /// whether its outcome still applies by the time it lands.
    pub async fn select_date(
        &self,
        session_id: Uuid,
        raw_date: Value,
    ) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;

        let (ticket, provider_id, service_id) = {
            let mut guard = flow.lock().await;
            guard.tick(self.clock.now());
            let ticket =
                guard.begin_date_selection(&raw_date, self.clock.today(), self.clock.now())?;
            (ticket, guard.provider_id(), guard.service_id())
        };

        let outcome = match self
            .availability
            .fetch_windows(provider_id, service_id, ticket.date)
            .await
        {
            Ok(windows) => FetchOutcome::Windows(windows),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        };

        let mut guard = flow.lock().await;
        let status = guard.complete_date_selection(ticket, outcome, self.clock.now());
        if status == CompletionStatus::Stale {
            debug!("Session {}: availability response superseded", session_id);
        }
        Ok(Self::snapshot_of(session_id, &guard, FlowEffect::None))
    }

    /// Pick a slot from the derived list and open the booking form.
    pub async fn select_slot(
        &self,
        session_id: Uuid,
        slot_start: NaiveDateTime,
    ) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;
        let mut guard = flow.lock().await;
        guard.tick(self.clock.now());
        let effect = guard.select_slot(slot_start)?;
        Ok(Self::snapshot_of(session_id, &guard, effect))
    }

    /// Submit the selection. The payment amount is computed from current
    /// price data and stored with the confirmed record.
    pub async fn submit(
        &self,
        session_id: Uuid,
        note: Option<String>,
    ) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;

        let (ticket, provider_id, service_id) = {
            let mut guard = flow.lock().await;
            guard.tick(self.clock.now());
            let ticket = guard.begin_submission(note, self.clock.now())?;
            (ticket, guard.provider_id(), guard.service_id())
        };

        let price = self.pricing.current_price(service_id).await;
        let amount = PricingService::payment_amount(price.as_ref(), self.default_visit_amount);

        let request = SubmitAppointmentRequest {
            provider_id,
            service_id,
            patient_id: ticket.identity.user_id.clone(),
            start_date: ticket.start,
            end_date: ticket.end,
            description: ticket.note.clone().unwrap_or_default(),
            attachments: Vec::new(),
        };

        let outcome = self
            .submission
            .submit(request, &ticket.identity.token)
            .await
            .map(|record| (record, amount))
            .map_err(|e| e.to_string());

        let mut guard = flow.lock().await;
        guard.complete_submission(outcome, self.clock.now())?;
        Ok(Self::snapshot_of(session_id, &guard, FlowEffect::None))
    }

    /// Hand off to the payment gateway. The amount is recomputed here, at
    /// redirect time, from current price data - not read back from the
    /// figure cached at submission.
    pub async fn initiate_payment(&self, session_id: Uuid) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;

        let (ticket, service_id) = {
            let mut guard = flow.lock().await;
            guard.tick(self.clock.now());
            let ticket = guard.begin_payment()?;
            (ticket, guard.service_id())
        };

        let price = self.pricing.current_price(service_id).await;
        let amount = PricingService::payment_amount(price.as_ref(), self.default_visit_amount);

        let outcome = self
            .payment
            .initiate(amount, ticket.appointment_id, &ticket.token)
            .await
            .map_err(|e| e.to_string());

        let mut guard = flow.lock().await;
        let effect = guard.complete_payment(outcome, self.clock.now())?;
        Ok(Self::snapshot_of(session_id, &guard, effect))
    }

    /// Acknowledge a blocking payment alert.
    pub async fn acknowledge_alert(&self, session_id: Uuid) -> Result<FlowSnapshot, BookingError> {
        let flow = self.flow(session_id).await?;
        let mut guard = flow.lock().await;
        guard.acknowledge_alert();
        Ok(Self::snapshot_of(session_id, &guard, FlowEffect::None))
    }
}
