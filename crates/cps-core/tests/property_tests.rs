//! # Property-Based Tests
//!
//! Invariants of the session state machine, checked with proptest.

use cps_core::{
    ChatResponse, MetacogElement, ScaffoldingData, SessionMachine, SessionResponse, Stage,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

// =============================================================================
// HELPERS
// =============================================================================

fn answer(stage: &str, tags: Vec<String>) -> ChatResponse {
    ChatResponse {
        session_id: "prop".to_string(),
        agent_message: "question".to_string(),
        scaffolding_data: ScaffoldingData {
            current_stage: stage.to_string(),
            detected_metacog_needs: tags,
            response_depth: "shallow".to_string(),
            scaffolding_question: "question".to_string(),
            should_transition: false,
            reasoning: String::new(),
        },
        turn_counts: None,
        forced_transition: false,
        forced_transition_message: None,
        timestamp: "2025-03-01T09:00:00".to_string(),
    }
}

/// Submit one message and resolve it with `response`.
fn round_trip(machine: &mut SessionMachine, response: ChatResponse) {
    let ticket = machine.begin_submit("turn").expect("accepted");
    if ticket.needs_session() {
        machine.attach_session(
            &ticket,
            SessionResponse {
                session_id: "prop".to_string(),
                created_at: "2025-03-01T09:00:00".to_string(),
            },
        );
    }
    machine.apply_response(ticket, response).expect("live ticket");
}

fn tag_pool() -> Vec<&'static str> {
    vec!["점검", "조절", "지식", "monitoring", "control", "knowledge", "추론", ""]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// With strictly increasing distinct stages, the completed set after N
    /// answers is exactly the first N-1 stages, in order.
    #[test]
    fn completed_stages_are_all_but_the_current(
        stages in subsequence(Stage::ALL.to_vec(), 1..=Stage::COUNT)
    ) {
        let mut machine = SessionMachine::new();
        for stage in &stages {
            round_trip(&mut machine, answer(stage.id(), Vec::new()));
        }

        let expected = &stages[..stages.len() - 1];
        prop_assert_eq!(machine.completed_stages(), expected);
        prop_assert_eq!(machine.current_stage(), stages.last().copied());
    }

    /// Repeating a stage in the answer stream never duplicates completed entries.
    #[test]
    fn completed_set_is_duplicate_free(
        stages in vec(select(Stage::ALL.to_vec()), 1..30)
    ) {
        let mut machine = SessionMachine::new();
        for stage in &stages {
            round_trip(&mut machine, answer(stage.id(), Vec::new()));
        }

        let completed = machine.completed_stages();
        for (i, stage) in completed.iter().enumerate() {
            prop_assert!(!completed[i + 1..].contains(stage));
        }
        if let Some(current) = machine.current_stage() {
            prop_assert!(!completed.contains(&current));
        }
    }

    /// Adding the same stage twice equals adding it once.
    #[test]
    fn mark_completed_twice_is_a_no_op(
        seed in vec(select(Stage::ALL.to_vec()), 0..6),
        stage in select(Stage::ALL.to_vec())
    ) {
        let mut once = SessionMachine::new();
        let mut twice = SessionMachine::new();
        for s in &seed {
            once.mark_completed(*s);
            twice.mark_completed(*s);
        }
        once.mark_completed(stage);
        twice.mark_completed(stage);
        twice.mark_completed(stage);

        prop_assert_eq!(once.completed_stages(), twice.completed_stages());
    }

    /// Each counter grows by exactly the matching tags of every answer.
    #[test]
    fn tally_is_monotonic(
        batches in vec(vec(select(tag_pool()), 0..6), 1..12)
    ) {
        let mut machine = SessionMachine::new();
        for batch in batches {
            let before = machine.tally();
            let tags: Vec<String> = batch.iter().map(|t| t.to_string()).collect();
            round_trip(&mut machine, answer(Stage::ExploringData.id(), tags));
            let after = machine.tally();

            for element in MetacogElement::ALL {
                let added = batch
                    .iter()
                    .filter(|t| MetacogElement::parse(t) == Some(element))
                    .count() as u64;
                prop_assert_eq!(after.get(element), before.get(element) + added);
            }
        }
    }

    /// Blank input never changes state.
    #[test]
    fn blank_input_is_ignored(spaces in "[ \t\n]{0,8}") {
        let mut machine = SessionMachine::new();
        prop_assert!(machine.begin_submit(&spaces).is_err());
        prop_assert!(machine.messages().is_empty());
        prop_assert!(!machine.is_busy());
    }
}
