//! # Text Rendering
//!
//! Plain-text views of conversation state and research data. Every function
//! returns a `String` so the CLI decides where it goes.

use cps_core::{
    ConversationRecord, Message, MetacogElement, ProgressView, ResponseDepth, Role,
    ScaffoldingData, SessionConversations, SessionInfo, SessionList, SessionTransitions,
    SidebarView, Stage, StageTransition, TurnLevel, TurnStatus, purpose_for,
};

/// Width of text progress bars.
const BAR_WIDTH: usize = 20;

fn bar(percent: u8) -> String {
    let filled = (percent as usize).min(100).saturating_mul(BAR_WIDTH) / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    )
}

fn stage_label(id: &str) -> String {
    Stage::from_id(id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| id.to_string())
}

/// One conversation message, with scaffolding tags for agent turns.
pub fn message(msg: &Message) -> String {
    let speaker = match msg.role {
        Role::User => "you",
        Role::Agent => "agent",
    };
    let mut out = format!("{speaker}> {}", msg.content);

    if msg.role == Role::Agent {
        let phase = msg.current_stage.as_deref().unwrap_or_default();
        for element in msg.elements() {
            let purpose = purpose_for(phase, element.tag());
            out.push_str(&format!("\n    [{}] {}", element.name(), purpose));
        }
        if let Some(depth) = msg.depth() {
            out.push_str(&format!("\n    depth: {}", depth.label()));
        }
    }
    out
}

/// Turn budget line: `Generating Ideas  3/5 turns [####----]  2 turns left`.
pub fn turn_status(stage: Stage, status: &TurnStatus) -> String {
    let tail = match status.level {
        TurnLevel::LimitReached => "turn limit reached".to_string(),
        TurnLevel::Warning => format!("only {} turns left", status.remaining),
        TurnLevel::Normal => format!("{} turns left", status.remaining),
    };
    format!(
        "{}  {}/{} turns {}  {}",
        stage.phase().label(),
        status.current,
        status.max,
        bar(status.percent),
        tail
    )
}

/// Step counter and one line per phase.
pub fn progress(view: &ProgressView) -> String {
    let mut out = match view.step {
        Some(step) => format!("Step {}/{} {}", step, view.total, bar(view.percent)),
        None => "Not started".to_string(),
    };
    for phase in &view.phases {
        let marker = if phase.is_completed {
            "done"
        } else if phase.is_active {
            "now"
        } else if phase.is_pending {
            "todo"
        } else {
            "part"
        };
        out.push_str(&format!(
            "\n  {:<4} {} ({}/{})",
            marker,
            phase.phase.label(),
            phase.completed,
            phase.total
        ));
    }
    out
}

/// Metacognition summary; details only when toggled on.
pub fn sidebar(view: &SidebarView) -> String {
    let mut out = format!("Messages: {}", view.total_messages);
    if !view.show_details {
        return out;
    }
    for element in MetacogElement::ALL {
        out.push_str(&format!(
            "\n  {:<10} {}",
            element.name(),
            view.tally.get(element)
        ));
    }
    match view.depth {
        Some(depth) => out.push_str(&format!("\n  Depth: {} - {}", depth.label(), depth.hint())),
        None => out.push_str("\n  Depth: start the conversation"),
    }
    out
}

/// Notice for a stage change.
pub fn transition(t: &StageTransition) -> String {
    if t.from.is_terminal() {
        return format!("Well done! {}. {}.", t.completion_message(), t.next_label());
    }
    format!(
        "Well done! {}. Moving on to {}.",
        t.completion_message(),
        t.next_label()
    )
}

/// The assignment the session was started with.
pub fn assignment(session: &SessionInfo) -> String {
    format!("Assignment: {}", session.assignment_text.trim())
}

/// The scaffolding behind the latest answer, for the details view.
pub fn scaffolding(data: &ScaffoldingData) -> String {
    let mut out = format!("  Question: {}", data.scaffolding_question);
    out.push_str(&format!(
        "\n  Ready to move on: {}",
        if data.should_transition { "yes" } else { "not yet" }
    ));
    if !data.reasoning.is_empty() {
        out.push_str(&format!("\n  Reasoning: {}", data.reasoning));
    }
    out
}

/// Catalog listing for `stages`.
pub fn catalog() -> String {
    Stage::ALL
        .iter()
        .map(|s| {
            format!(
                "{}. {:<28} {:<12} {}",
                s.index() + 1,
                s.name(),
                s.short_name(),
                s.id()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Research session listing.
pub fn session_list(list: &SessionList) -> String {
    let mut out = format!("Sessions: {}", list.total);
    for s in &list.sessions {
        let state = match (&s.completed_at, s.is_active) {
            (Some(_), _) => "completed",
            (None, true) => "active",
            (None, false) => "inactive",
        };
        out.push_str(&format!(
            "\n  {}  {}  {:<9} {}",
            s.session_id,
            s.created_at,
            state,
            first_line(&s.assignment_text)
        ));
    }
    out
}

fn conversation_record(c: &ConversationRecord) -> String {
    let stage = c.cps_stage.as_deref().map(stage_label).unwrap_or_default();
    let mut out = format!("#{} {} [{}] {}", c.id, c.role, stage, c.message);
    let tags: Vec<&str> = c
        .metacog_elements
        .iter()
        .flatten()
        .filter_map(|t| MetacogElement::parse(t))
        .map(|e| e.name())
        .collect();
    if !tags.is_empty() {
        out.push_str(&format!("\n    metacognition: {}", tags.join(", ")));
    }
    if let Some(depth) = c.response_depth.as_deref().and_then(ResponseDepth::parse) {
        out.push_str(&format!("\n    depth: {}", depth.label()));
    }
    if let Some(reasoning) = c.reasoning.as_deref().filter(|r| !r.is_empty()) {
        out.push_str(&format!("\n    reasoning: {reasoning}"));
    }
    out
}

/// Transcript of one recorded session.
pub fn conversations(data: &SessionConversations) -> String {
    let mut out = format!("Session {} ({} messages)", data.session_id, data.total);
    for c in &data.conversations {
        out.push('\n');
        out.push_str(&conversation_record(c));
    }
    out
}

/// Stage changes of one recorded session.
pub fn transitions(data: &SessionTransitions) -> String {
    let mut out = format!("Session {} ({} transitions)", data.session_id, data.total);
    for t in &data.transitions {
        let from = t
            .from_stage
            .as_deref()
            .map(stage_label)
            .unwrap_or_else(|| "start".to_string());
        out.push_str(&format!(
            "\n  {}  {} -> {}  after {} messages",
            t.created_at,
            from,
            stage_label(&t.to_stage),
            t.message_count
        ));
        if let Some(reason) = t.transition_reason.as_deref().filter(|r| !r.is_empty()) {
            out.push_str(&format!(" ({reason})"));
        }
    }
    out
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cps_core::{MetacogTally, Phase, SessionSummary, TransitionRecord};

    #[test]
    fn bar_is_fixed_width() {
        assert_eq!(bar(0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(bar(50).len(), BAR_WIDTH + 2);
    }

    #[test]
    fn agent_message_shows_phase_purpose() {
        let mut msg = Message::agent("What do you know already?");
        msg.current_stage = Some(Stage::ExploringData.id().to_string());
        msg.metacog_elements = Some(vec!["지식".to_string()]);
        msg.response_depth = Some("deep".to_string());

        let text = message(&msg);
        assert!(text.starts_with("agent> What do you know already?"));
        assert!(text.contains("[knowledge] Use prior experience"));
        assert!(text.contains("depth: Deep thinking"));
    }

    #[test]
    fn user_message_has_no_tags() {
        assert_eq!(message(&Message::user("hi")), "you> hi");
    }

    #[test]
    fn turn_line_levels() {
        let status = TurnStatus::from_count(cps_core::TurnCount::new(5, 5), "x").expect("valid");
        assert!(turn_status(Stage::GeneratingIdeas, &status).ends_with("turn limit reached"));
    }

    #[test]
    fn sidebar_hides_details_by_default() {
        let view = SidebarView {
            tally: MetacogTally::default(),
            depth: None,
            total_messages: 4,
            show_details: false,
        };
        assert_eq!(sidebar(&view), "Messages: 4");

        let detailed = SidebarView {
            show_details: true,
            ..view
        };
        assert!(sidebar(&detailed).contains("monitoring"));
    }

    #[test]
    fn progress_lists_every_phase() {
        let view = ProgressView::compute(Some(Stage::GeneratingIdeas), &Stage::ALL[..3]);
        let text = progress(&view);
        assert!(text.starts_with("Step 4/6"));
        assert!(text.contains(&format!("done {}", Phase::Understanding.label())));
        assert!(text.contains(&format!("now  {}", Phase::Ideation.label())));
    }

    #[test]
    fn leaving_the_last_stage_reads_complete() {
        let forward = StageTransition {
            from: Stage::GeneratingIdeas,
            to: Stage::DevelopingSolutions,
        };
        assert!(transition(&forward).ends_with("Moving on to Developing Solutions."));

        let back = StageTransition {
            from: Stage::BuildingAcceptance,
            to: Stage::DevelopingSolutions,
        };
        assert_eq!(
            transition(&back),
            "Well done! You built a concrete action plan. Complete."
        );
    }

    #[test]
    fn scaffolding_details() {
        let data = ScaffoldingData {
            current_stage: Stage::ExploringData.id().to_string(),
            detected_metacog_needs: Vec::new(),
            response_depth: "deep".to_string(),
            scaffolding_question: "Which facts matter most?".to_string(),
            should_transition: true,
            reasoning: String::new(),
        };
        let text = scaffolding(&data);
        assert!(text.contains("Question: Which facts matter most?"));
        assert!(text.contains("Ready to move on: yes"));
        assert!(!text.contains("Reasoning"));
    }

    #[test]
    fn session_states() {
        let list = SessionList {
            total: 1,
            sessions: vec![SessionSummary {
                session_id: "abc".to_string(),
                user_id: None,
                assignment_text: "Design a garden\nwith details".to_string(),
                created_at: "2025-03-01".to_string(),
                updated_at: None,
                completed_at: Some("2025-03-02".to_string()),
                is_active: false,
            }],
        };
        let text = session_list(&list);
        assert!(text.contains("completed"));
        assert!(text.contains("Design a garden"));
        assert!(!text.contains("with details"));
    }

    #[test]
    fn first_transition_starts_from_start() {
        let data = SessionTransitions {
            session_id: "abc".to_string(),
            total: 1,
            transitions: vec![TransitionRecord {
                id: 1,
                from_stage: None,
                to_stage: Stage::ConstructingOpportunities.id().to_string(),
                transition_reason: None,
                message_count: 0,
                created_at: "2025-03-01".to_string(),
            }],
        };
        assert!(transitions(&data).contains("start -> Understanding the Challenge"));
    }
}
