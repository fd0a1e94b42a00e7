//! # Conversation Controller
//!
//! Drives one [`SessionMachine`] against a [`ChatTransport`].
//!
//! The machine sits behind a mutex that is never held across an await, so
//! `submit` takes `&self` and a second submission while one is in flight is
//! rejected by the machine's busy flag instead of being queued. Nothing is
//! retried; a failed round-trip becomes one fallback agent message.

use crate::transport::ChatTransport;
use cps_core::{Applied, ResponseEffects, SessionMachine, SubmitRejected};
use std::sync::{Mutex, MutexGuard};

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not sent: blank input, busy, or closed.
    Rejected(SubmitRejected),
    /// The backend answered and the answer was applied.
    Answered(ResponseEffects),
    /// The round-trip failed; the fallback message was appended.
    Failed,
    /// The view was closed while the request was in flight.
    Discarded,
}

/// Owns the conversation state and the transport used to advance it.
#[derive(Debug)]
pub struct ChatController<T> {
    machine: Mutex<SessionMachine>,
    transport: T,
}

impl<T: ChatTransport> ChatController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            machine: Mutex::new(SessionMachine::new()),
            transport,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionMachine) -> R) -> R {
        f(&self.lock())
    }

    /// Change presentation state (view toggles, notice dismissal).
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionMachine) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit one learner message.
    ///
    /// Starts a session first when none exists, using `text` as the
    /// assignment.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let ticket = match self.lock().begin_submit(text) {
            Ok(ticket) => ticket,
            Err(reason) => {
                tracing::debug!(?reason, "submission rejected");
                return SubmitOutcome::Rejected(reason);
            }
        };

        if ticket.needs_session() {
            match self.transport.create_session(ticket.text()).await {
                Ok(session) => {
                    tracing::info!(session_id = %session.session_id, "session created");
                    if self.lock().attach_session(&ticket, session) == Applied::Stale {
                        return SubmitOutcome::Discarded;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to create session");
                    return self.fail(ticket);
                }
            }
        }

        let request = self.lock().request_for(&ticket);
        match self.transport.send_message(&request).await {
            Ok(response) => {
                if request.session_id.as_deref() != Some(response.session_id.as_str()) {
                    tracing::warn!(
                        sent = ?request.session_id,
                        received = %response.session_id,
                        "backend answered for a different session id"
                    );
                }
                match self.lock().apply_response(ticket, response) {
                    Some(effects) => {
                        if let Some(stage) = &effects.unknown_stage {
                            tracing::warn!(stage = %stage, "backend reported a stage outside the catalog");
                        }
                        if let Some(transition) = effects.transition {
                            tracing::info!(
                                from = transition.from.id(),
                                to = transition.to.id(),
                                "stage transition"
                            );
                        }
                        SubmitOutcome::Answered(effects)
                    }
                    None => SubmitOutcome::Discarded,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send message");
                self.fail(ticket)
            }
        }
    }

    fn fail(&self, ticket: cps_core::PendingTurn) -> SubmitOutcome {
        match self.lock().apply_failure(ticket) {
            Applied::Updated => SubmitOutcome::Failed,
            Applied::Stale => SubmitOutcome::Discarded,
        }
    }

    /// Tear the conversation down; answers still in flight are dropped.
    pub fn close(&self) {
        self.lock().close();
        tracing::debug!("conversation closed");
    }
}
