//! # cps-core
//!
//! The deterministic conversation core of the CPS scaffolding client - THE LOGIC.
//!
//! A learner talks to a scaffolding agent that walks them through the six
//! stages of Creative Problem Solving. The backend decides the stage, tags
//! each turn with the metacognitive support it gave and tracks turn budgets;
//! this crate folds those answers into client state and projects the views
//! built on top of it.
//!
//! ## Modules
//!
//! - `catalog` → stages, phases, metacognition tags, response depths
//! - `purpose` → scaffolding purpose lookup
//! - `turns` → turn budget projection
//! - `progress` → phase and step progress
//! - `session` → the session/stage state machine
//! - `types` → wire structures and errors
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Integer arithmetic only
//! - State changes only through [`SessionMachine`] transitions

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod progress;
pub mod purpose;
pub mod session;
pub mod turns;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ChatRequest, ChatResponse, ConversationRecord, CpsError, Delivery, HealthResponse, Message,
    Role, ScaffoldingData, SessionConversations, SessionCreate, SessionList, SessionResponse,
    SessionSummary, SessionTransitions, TransitionRecord, TurnCount, TurnCounts,
};

// =============================================================================
// RE-EXPORTS: Catalog
// =============================================================================

pub use catalog::{MetacogElement, MetacogTally, Phase, ResponseDepth, Stage};

// =============================================================================
// RE-EXPORTS: Projections and State Machine
// =============================================================================

pub use progress::{PhaseProgress, ProgressView};
pub use purpose::{phase_purpose, purpose_for};
pub use session::{
    Applied, FALLBACK_ERROR_TEXT, PendingTurn, ResponseEffects, SessionInfo, SessionMachine,
    SidebarView, StageTransition, SubmitRejected, ViewFlags,
};
pub use turns::{TurnLevel, TurnStatus, budget_for, turn_status};
