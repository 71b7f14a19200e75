//! Submission controller: validation, the timed exchange, and the status lifecycle.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use shared::{
    domain::{Record, SubmissionStatus},
    protocol::{SubmissionPayload, WorkflowReply},
};
use tokio::{
    runtime::Handle,
    sync::{broadcast, watch},
    task::{AbortHandle, JoinHandle},
    time,
};
use tracing::{debug, info, warn};

use crate::{
    config::SubmissionSettings,
    error::{SettingsError, SubmitError, TransportError},
    record_store::RecordStore,
    transport::{HttpWorkflowTransport, TransportReply, WorkflowTransport},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Signals for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    StatusChanged(SubmissionStatus),
    /// Move keyboard focus back to the first form field.
    FocusFirstField,
}

/// What happened to a `submit` call. Callers that only watch the status signal may drop it.
#[derive(Debug)]
pub enum SubmitAttempt {
    /// A submission was already in flight; nothing was sent.
    Ignored,
    /// The record failed validation; status moved to `Error` without any I/O.
    Rejected(SubmitError),
    Dispatched(JoinHandle<Result<(), SubmitError>>),
}

impl SubmitAttempt {
    pub fn is_ignored(&self) -> bool {
        matches!(self, SubmitAttempt::Ignored)
    }

    /// Resolves to the classified outcome. `None` when ignored or cancelled by `shutdown`.
    pub async fn outcome(self) -> Option<Result<(), SubmitError>> {
        match self {
            SubmitAttempt::Ignored => None,
            SubmitAttempt::Rejected(err) => Some(Err(err)),
            SubmitAttempt::Dispatched(handle) => handle.await.ok(),
        }
    }
}

#[derive(Default)]
struct ControllerState {
    status: SubmissionStatus,
    /// Bumped per attempt and on shutdown; tasks compare it before mutating anything.
    generation: u64,
    exchange: Option<AbortHandle>,
    pending_reset: Option<AbortHandle>,
    /// The pending reset still has to emit `FocusFirstField`.
    focus_owed: bool,
}

impl ControllerState {
    /// Aborts the pending reset. Returns whether it still owed the focus signal.
    fn cancel_pending_reset(&mut self) -> bool {
        if let Some(reset) = self.pending_reset.take() {
            reset.abort();
        }
        std::mem::take(&mut self.focus_owed)
    }
}

struct ControllerShared {
    transport: Arc<dyn WorkflowTransport>,
    store: RecordStore,
    settings: SubmissionSettings,
    runtime: Handle,
    state: Mutex<ControllerState>,
    status_tx: watch::Sender<SubmissionStatus>,
    events: broadcast::Sender<ControllerEvent>,
}

#[derive(Clone)]
pub struct SubmissionController {
    shared: Arc<ControllerShared>,
}

impl SubmissionController {
    /// Builds a controller posting over HTTP to `settings.endpoint_url`.
    pub fn new(
        settings: SubmissionSettings,
        store: RecordStore,
        runtime: Handle,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let transport = HttpWorkflowTransport::from_settings(&settings)?;
        Ok(Self::with_transport(
            settings,
            store,
            Arc::new(transport),
            runtime,
        ))
    }

    pub fn with_transport(
        settings: SubmissionSettings,
        store: RecordStore,
        transport: Arc<dyn WorkflowTransport>,
        runtime: Handle,
    ) -> Self {
        let (status_tx, _) = watch::channel(SubmissionStatus::Idle);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(ControllerShared {
                transport,
                store,
                settings,
                runtime,
                state: Mutex::new(ControllerState::default()),
                status_tx,
                events,
            }),
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        self.shared.lock_state().status
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.status() == SubmissionStatus::Submitting
    }

    pub fn watch_status(&self) -> watch::Receiver<SubmissionStatus> {
        self.shared.status_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.shared.events.subscribe()
    }

    pub fn store(&self) -> &RecordStore {
        &self.shared.store
    }

    /// Submits whatever the session draft currently holds.
    pub fn submit_current(&self) -> SubmitAttempt {
        self.submit(self.shared.store.get())
    }

    pub fn submit(&self, record: Record) -> SubmitAttempt {
        let shared = &self.shared;
        let mut state = shared.lock_state();

        if state.status == SubmissionStatus::Submitting {
            debug!(
                generation = state.generation,
                "submission already in flight; ignoring submit"
            );
            return SubmitAttempt::Ignored;
        }

        if state.cancel_pending_reset() {
            let _ = shared.events.send(ControllerEvent::FocusFirstField);
        }
        state.generation += 1;
        let generation = state.generation;

        if let Err(err) = record.validate() {
            warn!(generation, "submission rejected before dispatch: {err}");
            shared.set_status(&mut state, SubmissionStatus::Error);
            shared.schedule_reset(
                &mut state,
                generation,
                shared.settings.error_reset_delay,
                shared.settings.focus_after_error,
            );
            return SubmitAttempt::Rejected(err.into());
        }

        shared.set_status(&mut state, SubmissionStatus::Submitting);
        info!(
            generation,
            order_number = %record.order_number,
            store = record.store.as_str(),
            "dispatching submission"
        );

        let task_shared = Arc::clone(shared);
        let handle = shared
            .runtime
            .spawn(async move { task_shared.run_exchange(generation, record).await });
        state.exchange = Some(handle.abort_handle());
        SubmitAttempt::Dispatched(handle)
    }

    /// Ends the session: aborts the in-flight exchange and any pending reset, returns to `Idle`.
    pub fn shutdown(&self) {
        let shared = &self.shared;
        let mut state = shared.lock_state();
        state.generation += 1;
        if let Some(exchange) = state.exchange.take() {
            exchange.abort();
        }
        state.cancel_pending_reset();
        shared.set_status(&mut state, SubmissionStatus::Idle);
        debug!(generation = state.generation, "submission controller shut down");
    }
}

impl ControllerShared {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run_exchange(
        self: Arc<Self>,
        generation: u64,
        record: Record,
    ) -> Result<(), SubmitError> {
        let payload = SubmissionPayload::from(&record);
        let budget = self.settings.request_timeout;
        let started = Instant::now();

        // Expiry drops the request future, which cancels the request.
        let exchange = self.transport.post_submission(&payload);
        let outcome = match time::timeout(budget, exchange).await {
            Ok(result) => classify_reply(result, &self.settings.accepted_success_message),
            Err(_) => Err(SubmitError::Timeout(budget)),
        };

        debug!(
            generation,
            elapsed = ?started.elapsed(),
            "submission exchange concluded"
        );
        self.conclude(generation, outcome)
    }

    fn conclude(
        self: &Arc<Self>,
        generation: u64,
        outcome: Result<(), SubmitError>,
    ) -> Result<(), SubmitError> {
        let mut state = self.lock_state();
        if state.generation != generation {
            warn!(
                generation,
                current = state.generation,
                "discarding outcome of a superseded submission"
            );
            return outcome;
        }
        state.exchange = None;

        match &outcome {
            Ok(()) => {
                self.store.reset();
                info!(generation, "workflow confirmed submission");
                self.set_status(&mut state, SubmissionStatus::Success);
                self.schedule_reset(
                    &mut state,
                    generation,
                    self.settings.success_reset_delay,
                    true,
                );
            }
            Err(err) => {
                warn!(generation, kind = ?err.kind(), "submission failed: {err}");
                self.set_status(&mut state, SubmissionStatus::Error);
                self.schedule_reset(
                    &mut state,
                    generation,
                    self.settings.error_reset_delay,
                    self.settings.focus_after_error,
                );
            }
        }
        outcome
    }

    fn schedule_reset(
        self: &Arc<Self>,
        state: &mut ControllerState,
        generation: u64,
        delay: Duration,
        restore_focus: bool,
    ) {
        state.cancel_pending_reset();
        let shared = Arc::clone(self);
        let reset = self.runtime.spawn(async move {
            time::sleep(delay).await;
            let mut state = shared.lock_state();
            if state.generation != generation || !state.status.is_transient() {
                return;
            }
            state.pending_reset = None;
            state.focus_owed = false;
            shared.set_status(&mut state, SubmissionStatus::Idle);
            if restore_focus {
                let _ = shared.events.send(ControllerEvent::FocusFirstField);
            }
        });
        state.pending_reset = Some(reset.abort_handle());
        state.focus_owed = restore_focus;
    }

    fn set_status(&self, state: &mut ControllerState, status: SubmissionStatus) {
        if state.status == status {
            return;
        }
        debug!(from = %state.status, to = %status, "submission status changed");
        state.status = status;
        self.status_tx.send_replace(status);
        let _ = self.events.send(ControllerEvent::StatusChanged(status));
    }
}

/// Maps a transport result onto the outcome: 2xx, JSON body, and an exact `message` match.
pub fn classify_reply(
    result: Result<TransportReply, TransportError>,
    accepted_message: &str,
) -> Result<(), SubmitError> {
    let reply = result?;
    if !reply.is_success() {
        return Err(TransportError::Status {
            status: reply.status,
        }
        .into());
    }

    let body: serde_json::Value =
        serde_json::from_slice(&reply.body).map_err(SubmitError::ResponseFormat)?;
    let reply = WorkflowReply::from_json(&body);
    if reply.confirms(accepted_message) {
        Ok(())
    } else {
        Err(SubmitError::Rejected {
            message: reply.message,
        })
    }
}
