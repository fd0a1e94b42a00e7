//! # Session Module
//!
//! The conversation state machine: session identity, current stage,
//! completed stages, turn budgets and the metacognition tally, all derived by
//! folding backend answers in one at a time.
//!
//! ## States
//!
//! ```text
//! NoSession ──attach_session──▶ Active(stage?, completed, turns, tally)
//!                                  │ apply_response / apply_failure
//!                                  └──────────────▶ Active(updated)
//! ```
//!
//! ## Submission Protocol
//!
//! The machine does no I/O. A caller drives one round-trip as:
//! 1. [`SessionMachine::begin_submit`] appends the user message as
//!    [`Delivery::Pending`] and hands out a [`PendingTurn`] ticket.
//! 2. If `ticket.needs_session()`, create a session and pass it to
//!    [`SessionMachine::attach_session`].
//! 3. Send [`SessionMachine::request_for`] and resolve the ticket with
//!    [`SessionMachine::apply_response`] or [`SessionMachine::apply_failure`].
//!
//! Only one ticket is outstanding at a time, so answers are applied in the
//! order requests were issued. [`SessionMachine::close`] bumps the generation;
//! tickets issued before it resolve as no-ops.

use crate::catalog::{MetacogTally, ResponseDepth, Stage};
use crate::progress::ProgressView;
use crate::turns::{TurnStatus, turn_status};
use crate::types::{
    ChatRequest, ChatResponse, CpsError, Delivery, Message, ScaffoldingData, SessionResponse,
    TurnCounts,
};
use serde::{Deserialize, Serialize};

/// Text of the agent message appended when a round-trip fails.
pub const FALLBACK_ERROR_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Notice shown for a forced transition the backend did not explain.
pub const DEFAULT_FORCED_TRANSITION_TEXT: &str =
    "The turn limit for this stage was reached, so the conversation moves on.";

// =============================================================================
// SUPPORTING TYPES
// =============================================================================

/// Identity of the active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    /// The learner's first message; fixed for the life of the session.
    pub assignment_text: String,
    pub created_at: String,
}

/// A stage change reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
}

impl StageTransition {
    /// Congratulation for the stage that was left.
    #[must_use]
    pub fn completion_message(&self) -> &'static str {
        self.from.completion_message()
    }

    /// Catalog successor of the stage that was left, or "Complete" after the last one.
    #[must_use]
    pub fn next_label(&self) -> &'static str {
        self.from.next_stage_label()
    }
}

/// Presentation toggles owned by the conversation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFlags {
    pub sidebar_open: bool,
    pub show_details: bool,
    pub transition_notice_visible: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            show_details: false,
            transition_notice_visible: false,
        }
    }
}

/// Data behind the metacognition sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarView {
    pub tally: MetacogTally,
    pub depth: Option<ResponseDepth>,
    pub total_messages: usize,
    pub show_details: bool,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Empty or whitespace-only text.
    Blank,
    /// A request is already in flight.
    Busy,
    /// The view was torn down.
    Closed,
}

/// Outcome of resolving a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The ticket predates a `close()` or was already resolved.
    Stale,
}

/// What an applied answer changed, for the caller to announce.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseEffects {
    pub transition: Option<StageTransition>,
    /// The reported stage id when it is not in the catalog.
    pub unknown_stage: Option<String>,
    pub forced_transition: bool,
}

/// Ticket for the single outstanding submission.
#[derive(Debug)]
pub struct PendingTurn {
    generation: u64,
    message_index: usize,
    text: String,
    needs_session: bool,
    history: Vec<Message>,
}

impl PendingTurn {
    /// The submitted text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// A session must be created, with [`Self::text`] as assignment, before sending.
    #[must_use]
    pub fn needs_session(&self) -> bool {
        self.needs_session
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Client-side conversation state.
#[derive(Debug, Default)]
pub struct SessionMachine {
    session: Option<SessionInfo>,
    current: Option<Stage>,
    /// Insertion-ordered, duplicate-free.
    completed: Vec<Stage>,
    turn_counts: TurnCounts,
    tally: MetacogTally,
    last_depth: Option<ResponseDepth>,
    last_scaffolding: Option<ScaffoldingData>,
    forced_notice: Option<String>,
    transition: Option<StageTransition>,
    messages: Vec<Message>,
    /// Index of the pending user message while a request is in flight.
    in_flight: Option<usize>,
    generation: u64,
    closed: bool,
    view: ViewFlags,
}

impl SessionMachine {
    /// Create a machine with no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Accept `text` for sending.
    ///
    /// Appends the user message optimistically and marks the machine busy.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingTurn, SubmitRejected> {
        if self.closed {
            return Err(SubmitRejected::Closed);
        }
        if self.in_flight.is_some() {
            return Err(SubmitRejected::Busy);
        }
        if text.trim().is_empty() {
            return Err(SubmitRejected::Blank);
        }

        let history = self.messages.clone();
        let message_index = self.messages.len();
        self.messages.push(Message::user(text));
        self.in_flight = Some(message_index);

        Ok(PendingTurn {
            generation: self.generation,
            message_index,
            text: text.to_string(),
            needs_session: self.session.is_none(),
            history,
        })
    }

    /// Record the session created for `ticket`.
    ///
    /// Only valid while no session exists; the current stage stays unset until
    /// the first answer arrives.
    pub fn attach_session(&mut self, ticket: &PendingTurn, response: SessionResponse) -> Applied {
        if !self.is_live(ticket) || self.session.is_some() {
            return Applied::Stale;
        }
        self.session = Some(SessionInfo {
            session_id: response.session_id,
            assignment_text: ticket.text.clone(),
            created_at: response.created_at,
        });
        self.current = None;
        self.completed.clear();
        Applied::Updated
    }

    /// Build the chat request for `ticket`.
    #[must_use]
    pub fn request_for(&self, ticket: &PendingTurn) -> ChatRequest {
        ChatRequest {
            session_id: self.session.as_ref().map(|s| s.session_id.clone()),
            message: ticket.text.clone(),
            conversation_history: ticket.history.clone(),
            current_stage: self.current.map(|s| s.id().to_string()),
        }
    }

    /// Fold a backend answer in. Returns `None` for a stale ticket.
    pub fn apply_response(
        &mut self,
        ticket: PendingTurn,
        response: ChatResponse,
    ) -> Option<ResponseEffects> {
        if !self.is_live(&ticket) {
            return None;
        }

        let mut effects = ResponseEffects::default();
        let data = &response.scaffolding_data;

        match Stage::from_id(&data.current_stage) {
            Some(next) => {
                if let Some(previous) = self.current.filter(|p| *p != next) {
                    self.mark_completed(previous);
                    let transition = StageTransition {
                        from: previous,
                        to: next,
                    };
                    self.transition = Some(transition);
                    self.view.transition_notice_visible = true;
                    effects.transition = Some(transition);
                }
                // A stage the backend returns to is current again, not completed.
                self.completed.retain(|s| *s != next);
                self.current = Some(next);
            }
            None => effects.unknown_stage = Some(data.current_stage.clone()),
        }

        self.tally.record_tags(&data.detected_metacog_needs);
        self.last_depth = ResponseDepth::parse(&data.response_depth);

        if let Some(counts) = &response.turn_counts {
            self.turn_counts = counts.clone();
        }

        effects.forced_transition = response.forced_transition;
        self.forced_notice = response.forced_transition.then(|| {
            response
                .forced_transition_message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FORCED_TRANSITION_TEXT.to_string())
        });

        self.last_scaffolding = Some(response.scaffolding_data.clone());
        self.settle(ticket.message_index, Delivery::Confirmed);
        self.messages.push(Message::from_response(&response));

        Some(effects)
    }

    /// Resolve `ticket` as failed: one fallback agent message, busy cleared.
    ///
    /// The user message stays in the log, marked [`Delivery::Failed`].
    pub fn apply_failure(&mut self, ticket: PendingTurn) -> Applied {
        if !self.is_live(&ticket) {
            return Applied::Stale;
        }
        self.settle(ticket.message_index, Delivery::Failed);
        self.messages.push(Message::agent(FALLBACK_ERROR_TEXT));
        Applied::Updated
    }

    /// Tear the view down. Every outstanding ticket becomes stale.
    pub fn close(&mut self) {
        self.generation = self.generation.saturating_add(1);
        self.in_flight = None;
        self.closed = true;
    }

    /// Add `stage` to the completed set. Adding a present stage is a no-op.
    pub fn mark_completed(&mut self, stage: Stage) {
        if !self.completed.contains(&stage) {
            self.completed.push(stage);
        }
    }

    fn is_live(&self, ticket: &PendingTurn) -> bool {
        !self.closed
            && ticket.generation == self.generation
            && self.in_flight == Some(ticket.message_index)
    }

    fn settle(&mut self, index: usize, delivery: Delivery) {
        if let Some(message) = self.messages.get_mut(index) {
            message.delivery = delivery;
        }
        self.in_flight = None;
    }

    // -------------------------------------------------------------------------
    // View toggles
    // -------------------------------------------------------------------------

    pub fn toggle_sidebar(&mut self) -> bool {
        self.view.sidebar_open = !self.view.sidebar_open;
        self.view.sidebar_open
    }

    pub fn toggle_details(&mut self) -> bool {
        self.view.show_details = !self.view.show_details;
        self.view.show_details
    }

    pub fn dismiss_transition_notice(&mut self) {
        self.view.transition_notice_visible = false;
    }

    // -------------------------------------------------------------------------
    // Accessors and derived views
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    #[must_use]
    pub fn current_stage(&self) -> Option<Stage> {
        self.current
    }

    #[must_use]
    pub fn completed_stages(&self) -> &[Stage] {
        &self.completed
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn tally(&self) -> MetacogTally {
        self.tally
    }

    #[must_use]
    pub fn turn_counts(&self) -> &TurnCounts {
        &self.turn_counts
    }

    #[must_use]
    pub fn last_scaffolding(&self) -> Option<&ScaffoldingData> {
        self.last_scaffolding.as_ref()
    }

    #[must_use]
    pub fn forced_notice(&self) -> Option<&str> {
        self.forced_notice.as_deref()
    }

    /// The latest stage change, while its notice is visible.
    #[must_use]
    pub fn transition_notice(&self) -> Option<StageTransition> {
        self.transition
            .filter(|_| self.view.transition_notice_visible)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn view(&self) -> ViewFlags {
        self.view
    }

    #[must_use]
    pub fn progress(&self) -> ProgressView {
        ProgressView::compute(self.current, &self.completed)
    }

    /// Turn status of the current stage, if the backend sent a budget for it.
    #[must_use]
    pub fn turn_status(&self) -> Option<Result<TurnStatus, CpsError>> {
        self.current
            .and_then(|stage| turn_status(&self.turn_counts, stage))
    }

    #[must_use]
    pub fn sidebar(&self) -> SidebarView {
        SidebarView {
            tally: self.tally,
            depth: self.last_depth,
            total_messages: self.messages.len(),
            show_details: self.view.show_details,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
