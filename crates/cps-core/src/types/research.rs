//! Research endpoint payloads (`/api/research/...`).

use serde::{Deserialize, Serialize};

/// One recorded session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub assignment_text: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// Answer of `GET /api/research/sessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionList {
    pub total: u64,
    pub sessions: Vec<SessionSummary>,
}

/// One stored conversation turn with its CPS annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub role: String,
    pub message: String,
    #[serde(default)]
    pub cps_stage: Option<String>,
    #[serde(default)]
    pub metacog_elements: Option<Vec<String>>,
    #[serde(default)]
    pub response_depth: Option<String>,
    #[serde(default)]
    pub should_transition: Option<bool>,
    #[serde(default)]
    pub reasoning: Option<String>,
    pub created_at: String,
}

/// Answer of `GET /api/research/sessions/{id}/conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConversations {
    pub session_id: String,
    pub total: u64,
    pub conversations: Vec<ConversationRecord>,
}

/// One recorded stage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: i64,
    #[serde(default)]
    pub from_stage: Option<String>,
    pub to_stage: String,
    #[serde(default)]
    pub transition_reason: Option<String>,
    #[serde(default)]
    pub message_count: u32,
    pub created_at: String,
}

/// Answer of `GET /api/research/sessions/{id}/transitions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTransitions {
    pub session_id: String,
    pub total: u64,
    pub transitions: Vec<TransitionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_list_tolerates_nulls() {
        let json = r#"{
            "total": 1,
            "sessions": [{
                "session_id": "abc",
                "user_id": null,
                "assignment_text": "Plan a school garden",
                "created_at": "2025-03-01T09:00:00",
                "updated_at": "2025-03-01T09:30:00",
                "completed_at": null,
                "is_active": true
            }]
        }"#;
        let list: SessionList = serde_json::from_str(json).expect("parse");
        assert_eq!(list.total, 1);
        assert!(list.sessions[0].user_id.is_none());
        assert!(list.sessions[0].is_active);
    }

    #[test]
    fn first_transition_has_no_origin() {
        let json = r#"{
            "id": 1,
            "from_stage": null,
            "to_stage": "도전_이해_기회구성",
            "transition_reason": null,
            "message_count": 0,
            "created_at": "2025-03-01T09:00:00"
        }"#;
        let record: TransitionRecord = serde_json::from_str(json).expect("parse");
        assert!(record.from_stage.is_none());
        assert_eq!(record.message_count, 0);
    }
}
