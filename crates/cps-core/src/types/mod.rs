//! # Core Type Definitions
//!
//! This module contains the plain data exchanged with the scaffolding backend:
//! - Conversation messages (`Message`, `Role`, `Delivery`)
//! - Chat wire structures (`ChatRequest`, `ChatResponse`, `ScaffoldingData`)
//! - Session wire structures (`SessionCreate`, `SessionResponse`, `HealthResponse`)
//! - Turn budgets (`TurnCount`, `TurnCounts`)
//! - Error types (`CpsError`)
//!
//! ## Wire Compatibility
//!
//! Field names match the backend's JSON exactly. Stage ids, metacognition
//! tags and response depths stay plain strings here; they are interpreted by
//! [`crate::catalog`] so that an unexpected value from the backend never
//! fails deserialization of an otherwise valid answer.

mod research;

pub use research::{
    ConversationRecord, SessionConversations, SessionList, SessionSummary, SessionTransitions,
    TransitionRecord,
};

use crate::catalog::{MetacogElement, ResponseDepth, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// MESSAGES
// =============================================================================

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// Client-side delivery state of a locally created message.
///
/// User messages are appended before the backend confirms them. The entry
/// stays in the log either way; only its delivery state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Sent, awaiting the backend.
    Pending,
    /// The backend answered this message.
    #[default]
    Confirmed,
    /// The round-trip failed; the message is kept as typed.
    Failed,
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacog_elements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_depth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
    /// Never sent on the wire.
    #[serde(skip)]
    pub delivery: Delivery,
}

impl Message {
    /// Create a user message stamped with the current time.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: now_timestamp(),
            metacog_elements: None,
            response_depth: None,
            reasoning: None,
            current_stage: None,
            delivery: Delivery::Pending,
        }
    }

    /// Create a plain agent message stamped with the current time.
    #[must_use]
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            timestamp: now_timestamp(),
            metacog_elements: None,
            response_depth: None,
            reasoning: None,
            current_stage: None,
            delivery: Delivery::Confirmed,
        }
    }

    /// Build the agent message for a backend answer, carrying its scaffolding metadata.
    #[must_use]
    pub fn from_response(response: &ChatResponse) -> Self {
        let data = &response.scaffolding_data;
        Self {
            role: Role::Agent,
            content: response.agent_message.clone(),
            timestamp: response.timestamp.clone(),
            metacog_elements: Some(data.detected_metacog_needs.clone()),
            response_depth: Some(data.response_depth.clone()),
            reasoning: Some(data.reasoning.clone()),
            current_stage: Some(data.current_stage.clone()),
            delivery: Delivery::Confirmed,
        }
    }

    /// Metacognition elements attached to this message that the catalog recognises.
    pub fn elements(&self) -> impl Iterator<Item = MetacogElement> + '_ {
        self.metacog_elements
            .iter()
            .flatten()
            .filter_map(|tag| MetacogElement::parse(tag))
    }

    /// Response depth attached to this message, if recognised.
    #[must_use]
    pub fn depth(&self) -> Option<ResponseDepth> {
        self.response_depth.as_deref().and_then(ResponseDepth::parse)
    }

    /// Stage attached to this message, if it names a catalog stage.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        self.current_stage.as_deref().and_then(Stage::from_id)
    }
}

/// RFC 3339 timestamp for locally created messages.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

// =============================================================================
// TURN BUDGETS
// =============================================================================

/// Turn budget for one stage, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCount {
    pub current: u32,
    pub max: u32,
}

impl TurnCount {
    #[must_use]
    pub const fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }
}

/// Turn budgets keyed by stage id or phase key.
pub type TurnCounts = BTreeMap<String, TurnCount>;

// =============================================================================
// CHAT WIRE STRUCTURES
// =============================================================================

/// Body of `POST /api/chat/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<String>,
}

/// Scaffolding analysis attached to every agent answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldingData {
    pub current_stage: String,
    #[serde(default)]
    pub detected_metacog_needs: Vec<String>,
    pub response_depth: String,
    pub scaffolding_question: String,
    #[serde(default)]
    pub should_transition: bool,
    #[serde(default)]
    pub reasoning: String,
}

/// Answer of `POST /api/chat/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub agent_message: String,
    pub scaffolding_data: ScaffoldingData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_counts: Option<TurnCounts>,
    #[serde(default)]
    pub forced_transition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_transition_message: Option<String>,
    pub timestamp: String,
}

/// Body of `POST /api/chat/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreate {
    pub assignment_text: String,
}

/// Answer of `POST /api/chat/session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub created_at: String,
}

/// Answer of `GET /api/chat/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the CPS client.
///
/// - No silent failures
/// - Use `Result<T, CpsError>` for fallible operations
/// - The CORE should never panic; all errors must be recoverable
#[derive(Debug, Error)]
pub enum CpsError {
    /// A stage id that is not in the catalog.
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// A turn budget with `max == 0`.
    #[error("Invalid turn budget for {stage}: max is 0")]
    InvalidTurnBudget { stage: String },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The backend could not be reached or answered with an error.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response_json() -> &'static str {
        r#"{
            "session_id": "s-1",
            "agent_message": "What do you already know?",
            "scaffolding_data": {
                "current_stage": "도전_이해_자료탐색",
                "detected_metacog_needs": ["점검", "지식"],
                "response_depth": "medium",
                "scaffolding_question": "What do you already know?",
                "should_transition": false,
                "reasoning": "student listed facts"
            },
            "timestamp": "2025-03-01T10:00:00"
        }"#
    }

    #[test]
    fn chat_response_optional_fields_default() {
        let response: ChatResponse = serde_json::from_str(response_json()).expect("parse");
        assert!(response.turn_counts.is_none());
        assert!(!response.forced_transition);
        assert!(response.forced_transition_message.is_none());
    }

    #[test]
    fn chat_response_with_turn_counts() {
        let json = r#"{
            "session_id": "s-1",
            "agent_message": "Next?",
            "scaffolding_data": {
                "current_stage": "아이디어_생성",
                "detected_metacog_needs": [],
                "response_depth": "deep",
                "scaffolding_question": "Next?",
                "should_transition": true,
                "reasoning": ""
            },
            "turn_counts": {"아이디어_생성": {"current": 3, "max": 5}},
            "forced_transition": true,
            "forced_transition_message": "Moving on",
            "timestamp": "2025-03-01T10:00:00"
        }"#;
        let response: ChatResponse = serde_json::from_str(json).expect("parse");
        let counts = response.turn_counts.expect("turn counts");
        assert_eq!(counts.get("아이디어_생성"), Some(&TurnCount::new(3, 5)));
        assert!(response.forced_transition);
    }

    #[test]
    fn request_omits_absent_session_and_stage() {
        let request = ChatRequest {
            session_id: None,
            message: "hi".to_string(),
            conversation_history: Vec::new(),
            current_stage: None,
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("session_id"));
        assert!(!json.contains("current_stage"));
        assert!(json.contains("\"conversation_history\":[]"));
    }

    #[test]
    fn delivery_is_not_serialized() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).expect("serialize");
        assert!(!json.contains("delivery"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn agent_message_from_response_keeps_metadata() {
        let response: ChatResponse = serde_json::from_str(response_json()).expect("parse");
        let message = Message::from_response(&response);

        assert_eq!(message.role, Role::Agent);
        assert_eq!(message.stage(), Some(Stage::ExploringData));
        assert_eq!(message.depth(), Some(ResponseDepth::Medium));
        let elements: Vec<_> = message.elements().collect();
        assert_eq!(
            elements,
            vec![MetacogElement::Monitoring, MetacogElement::Knowledge]
        );
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let mut message = Message::agent("x");
        message.metacog_elements = Some(vec!["점검".into(), "guessing".into()]);
        assert_eq!(message.elements().count(), 1);
    }
}
