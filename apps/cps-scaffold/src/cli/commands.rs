//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::client::ApiClient;
use crate::config::Config;
use crate::controller::{ChatController, SubmitOutcome};
use crate::render;
use crate::transport::ChatTransport;
use cps_core::{CpsError, Role, ScaffoldingData, SessionMachine, Stage, SubmitRejected};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CpsError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CpsError::SerializationError(e.to_string()))?;
    println!("{text}");
    Ok(())
}

// =============================================================================
// CHAT COMMANDS
// =============================================================================

/// Chat commands understood by the interactive loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Quit,
    ToggleDetails,
    ToggleSidebar,
    Progress,
    Assignment,
}

impl ChatCommand {
    /// Parse a `/command` line. Anything else is a message.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "/quit" | "/exit" => Some(Self::Quit),
            "/details" => Some(Self::ToggleDetails),
            "/sidebar" => Some(Self::ToggleSidebar),
            "/progress" => Some(Self::Progress),
            "/assignment" => Some(Self::Assignment),
            _ => None,
        }
    }
}

/// Text printed after a submission: new agent messages and notices.
#[must_use]
pub fn turn_report(machine: &SessionMachine, from_index: usize) -> String {
    let mut lines: Vec<String> = machine
        .messages()
        .iter()
        .skip(from_index)
        .filter(|m| m.role == Role::Agent)
        .map(render::message)
        .collect();

    if let Some(notice) = machine.forced_notice() {
        lines.push(format!("! {notice}"));
    }
    if let Some(transition) = machine.transition_notice() {
        lines.push(format!("* {}", render::transition(&transition)));
    }
    if let Some(stage) = machine.current_stage() {
        match machine.turn_status() {
            Some(Ok(status)) => lines.push(render::turn_status(stage, &status)),
            Some(Err(e)) => tracing::warn!(error = %e, "ignoring turn budget"),
            None => lines.push(stage.to_string()),
        }
    }
    if let Some(data) = shown_scaffolding(machine) {
        lines.push(render::scaffolding(data));
    }
    if machine.view().sidebar_open {
        lines.push(render::sidebar(&machine.sidebar()));
    }
    lines.join("\n")
}

fn shown_scaffolding(machine: &SessionMachine) -> Option<&ScaffoldingData> {
    machine
        .last_scaffolding()
        .filter(|_| machine.view().show_details)
}

fn details_report(machine: &SessionMachine) -> String {
    let mut text = render::sidebar(&machine.sidebar());
    if let Some(data) = shown_scaffolding(machine) {
        text.push('\n');
        text.push_str(&render::scaffolding(data));
    }
    text
}

fn assignment_report(machine: &SessionMachine) -> String {
    machine
        .session()
        .map(render::assignment)
        .unwrap_or_else(|| "No assignment yet".to_string())
}

/// Machine-readable view of the same report.
fn turn_json(machine: &SessionMachine, from_index: usize, outcome: &SubmitOutcome) -> serde_json::Value {
    let agent_messages: Vec<_> = machine
        .messages()
        .iter()
        .skip(from_index)
        .filter(|m| m.role == Role::Agent)
        .collect();
    // Only a transition made by this turn; earlier ones were already reported.
    let transition = match outcome {
        SubmitOutcome::Answered(effects) => effects.transition,
        _ => None,
    };
    let outcome = match outcome {
        SubmitOutcome::Rejected(reason) => format!("rejected:{reason:?}").to_lowercase(),
        SubmitOutcome::Answered(_) => "answered".to_string(),
        SubmitOutcome::Failed => "failed".to_string(),
        SubmitOutcome::Discarded => "discarded".to_string(),
    };
    serde_json::json!({
        "outcome": outcome,
        "session_id": machine.session_id(),
        "assignment": machine.session().map(|s| s.assignment_text.as_str()),
        "current_stage": machine.current_stage(),
        "completed_stages": machine.completed_stages(),
        "messages": agent_messages,
        "transition": transition,
        "forced_transition_message": machine.forced_notice(),
        "turn_status": machine.turn_status().and_then(Result::ok),
        "progress": machine.progress(),
        "metacognition": machine.tally(),
    })
}

fn report<T: ChatTransport>(
    controller: &ChatController<T>,
    from_index: usize,
    outcome: &SubmitOutcome,
    json_mode: bool,
) -> Result<(), CpsError> {
    if json_mode {
        let value = controller.update(|m| {
            let value = turn_json(m, from_index, outcome);
            m.dismiss_transition_notice();
            value
        });
        return print_json(&value);
    }
    let text = controller.update(|m| {
        let text = turn_report(m, from_index);
        m.dismiss_transition_notice();
        text
    });
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

/// Interactive conversation over stdin.
pub async fn cmd_chat(config: &Config, json_mode: bool) -> Result<(), CpsError> {
    let controller = ChatController::new(ApiClient::from_config(config)?);
    tracing::info!(api_url = %config.api_url, "starting conversation");

    if !json_mode {
        println!("Describe your assignment to begin. Commands: /assignment /details /sidebar /progress /quit");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|e| CpsError::IoError(e.to_string()))?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match ChatCommand::parse(&line) {
            Some(ChatCommand::Quit) => break,
            Some(ChatCommand::ToggleDetails) => {
                let text = controller.update(|m| {
                    m.toggle_details();
                    details_report(m)
                });
                println!("{text}");
                continue;
            }
            Some(ChatCommand::ToggleSidebar) => {
                let open = controller.update(SessionMachine::toggle_sidebar);
                println!("Sidebar {}", if open { "shown" } else { "hidden" });
                continue;
            }
            Some(ChatCommand::Progress) => {
                println!("{}", controller.with_state(|m| render::progress(&m.progress())));
                continue;
            }
            Some(ChatCommand::Assignment) => {
                println!("{}", controller.with_state(assignment_report));
                continue;
            }
            None => {}
        }

        let (from_index, had_session) =
            controller.with_state(|m| (m.messages().len(), m.session().is_some()));
        let outcome = tokio::select! {
            outcome = controller.submit(&line) => outcome,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted while waiting for the agent");
                break;
            }
        };

        match outcome {
            SubmitOutcome::Rejected(SubmitRejected::Blank) => continue,
            SubmitOutcome::Rejected(SubmitRejected::Closed) | SubmitOutcome::Discarded => break,
            _ => {
                if !json_mode && !had_session {
                    let started = controller.with_state(|m| m.session().map(render::assignment));
                    if let Some(text) = started {
                        println!("{text}");
                    }
                }
                report(&controller, from_index, &outcome, json_mode)?;
            }
        }
    }

    controller.close();
    Ok(())
}

/// Start a session with one message and print the answer.
pub async fn cmd_send(config: &Config, json_mode: bool, text: &str) -> Result<(), CpsError> {
    let controller = ChatController::new(ApiClient::from_config(config)?);
    let outcome = controller.submit(text).await;
    match &outcome {
        SubmitOutcome::Rejected(SubmitRejected::Blank) => return Ok(()),
        SubmitOutcome::Rejected(reason) => {
            return Err(CpsError::TransportError(format!("message not sent: {reason:?}")));
        }
        _ => {}
    }
    report(&controller, 0, &outcome, json_mode)?;
    controller.close();

    if outcome == SubmitOutcome::Failed {
        return Err(CpsError::TransportError("the agent did not answer".to_string()));
    }
    Ok(())
}

// =============================================================================
// INFORMATION COMMANDS
// =============================================================================

/// Print the stage catalog.
pub fn cmd_stages(json_mode: bool) -> Result<(), CpsError> {
    if json_mode {
        let stages: Vec<_> = Stage::ALL
            .iter()
            .map(|s| {
                serde_json::json!({
                    "id": s.id(),
                    "name": s.name(),
                    "short_name": s.short_name(),
                    "phase": s.phase().name(),
                    "completion_message": s.completion_message(),
                })
            })
            .collect();
        print_json(&stages)?;
    } else {
        println!("{}", render::catalog());
    }
    Ok(())
}

/// Check the backend health endpoint.
pub async fn cmd_health(config: &Config, json_mode: bool) -> Result<(), CpsError> {
    let client = ApiClient::from_config(config)?;
    let health = client.health().await?;
    if json_mode {
        print_json(&health)?;
    } else {
        println!("Backend: {}", client.base_url());
        println!("Status:  {}", health.status);
        if let Some(service) = &health.service {
            println!("Service: {service}");
        }
    }
    Ok(())
}

// =============================================================================
// RESEARCH COMMANDS
// =============================================================================

/// List recorded sessions.
pub async fn cmd_sessions(
    config: &Config,
    json_mode: bool,
    user_id: Option<&str>,
    skip: u32,
    limit: Option<u32>,
) -> Result<(), CpsError> {
    let client = ApiClient::from_config(config)?;
    let limit = limit.unwrap_or(config.page_size);
    let list = client.list_sessions(user_id, skip, limit).await?;
    if json_mode {
        print_json(&list)?;
    } else {
        println!("{}", render::session_list(&list));
    }
    Ok(())
}

/// Show the transcript of a recorded session.
pub async fn cmd_conversations(
    config: &Config,
    json_mode: bool,
    session_id: &str,
) -> Result<(), CpsError> {
    let client = ApiClient::from_config(config)?;
    let data = client.session_conversations(session_id).await?;
    if json_mode {
        print_json(&data)?;
    } else {
        println!("{}", render::conversations(&data));
    }
    Ok(())
}

/// Show the stage transitions of a recorded session.
pub async fn cmd_transitions(
    config: &Config,
    json_mode: bool,
    session_id: &str,
) -> Result<(), CpsError> {
    let client = ApiClient::from_config(config)?;
    let data = client.session_transitions(session_id).await?;
    if json_mode {
        print_json(&data)?;
    } else {
        println!("{}", render::transitions(&data));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cps_core::{
        ChatResponse, PendingTurn, ResponseEffects, SessionResponse, TurnCount,
    };

    fn answer(machine: &mut SessionMachine, ticket: PendingTurn, stage: Stage) -> ResponseEffects {
        let mut turn_counts = cps_core::TurnCounts::new();
        turn_counts.insert(stage.id().to_string(), TurnCount::new(4, 5));
        let response = ChatResponse {
            session_id: "s1".to_string(),
            agent_message: "What do you already know?".to_string(),
            scaffolding_data: ScaffoldingData {
                current_stage: stage.id().to_string(),
                detected_metacog_needs: vec!["지식".to_string()],
                response_depth: "medium".to_string(),
                scaffolding_question: "What do you already know?".to_string(),
                should_transition: false,
                reasoning: String::new(),
            },
            turn_counts: Some(turn_counts),
            forced_transition: false,
            forced_transition_message: None,
            timestamp: "2025-03-01T09:00:00".to_string(),
        };
        machine.apply_response(ticket, response).expect("live ticket")
    }

    fn started(machine: &mut SessionMachine, assignment: &str) -> ResponseEffects {
        let ticket = machine.begin_submit(assignment).expect("accepted");
        machine.attach_session(
            &ticket,
            SessionResponse {
                session_id: "s1".to_string(),
                created_at: "2025-03-01T09:00:00".to_string(),
            },
        );
        answer(machine, ticket, Stage::ConstructingOpportunities)
    }

    #[test]
    fn slash_commands() {
        assert_eq!(ChatCommand::parse(" /quit "), Some(ChatCommand::Quit));
        assert_eq!(ChatCommand::parse("/details"), Some(ChatCommand::ToggleDetails));
        assert_eq!(ChatCommand::parse("/sidebar"), Some(ChatCommand::ToggleSidebar));
        assert_eq!(ChatCommand::parse("/assignment"), Some(ChatCommand::Assignment));
        assert_eq!(ChatCommand::parse("quit"), None);
    }

    #[test]
    fn report_shows_only_new_agent_messages() {
        let mut machine = SessionMachine::new();
        started(&mut machine, "Plan a garden");

        let text = turn_report(&machine, 0);
        assert!(!text.contains("you> Plan a garden"));
        assert!(text.contains("agent> What do you already know?"));
        assert!(text.contains("4/5 turns"));
        assert!(text.contains("only 1 turns left"));
        assert!(text.contains("Messages: 2"));
    }

    #[test]
    fn report_announces_transition() {
        let mut machine = SessionMachine::new();
        let first = machine.begin_submit("Plan a garden").expect("accepted");
        answer(&mut machine, first, Stage::ConstructingOpportunities);
        let second = machine.begin_submit("I have ideas").expect("accepted");
        answer(&mut machine, second, Stage::ExploringData);

        let text = turn_report(&machine, 2);
        assert!(text.contains("You explored the opportunity thoroughly"));
        assert!(text.contains("Moving on to Exploring Data"));

        machine.dismiss_transition_notice();
        assert!(!turn_report(&machine, 2).contains("Moving on"));
    }

    #[test]
    fn json_report_carries_state() {
        let mut machine = SessionMachine::new();
        let ticket = machine.begin_submit("Plan a garden").expect("accepted");
        answer(&mut machine, ticket, Stage::ConstructingOpportunities);

        let value = turn_json(&machine, 0, &SubmitOutcome::Failed);
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["current_stage"], Stage::ConstructingOpportunities.id());
        assert_eq!(value["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["turn_status"]["remaining"], 1);
    }

    #[test]
    fn json_transition_is_reported_once() {
        let mut machine = SessionMachine::new();
        started(&mut machine, "Plan a garden");

        let second = machine.begin_submit("I have ideas").expect("accepted");
        let effects = answer(&mut machine, second, Stage::ExploringData);
        let value = turn_json(&machine, 2, &SubmitOutcome::Answered(effects));
        assert_eq!(value["transition"]["to"], serde_json::json!(Stage::ExploringData));

        let third = machine.begin_submit("Here are the facts").expect("accepted");
        let effects = answer(&mut machine, third, Stage::ExploringData);
        let value = turn_json(&machine, 4, &SubmitOutcome::Answered(effects));
        assert!(value["transition"].is_null());
    }

    #[test]
    fn assignment_is_available_after_start() {
        let mut machine = SessionMachine::new();
        assert_eq!(assignment_report(&machine), "No assignment yet");

        started(&mut machine, "Plan a garden");
        let second = machine.begin_submit("I have ideas").expect("accepted");
        answer(&mut machine, second, Stage::ConstructingOpportunities);

        assert_eq!(assignment_report(&machine), "Assignment: Plan a garden");
        let value = turn_json(&machine, 2, &SubmitOutcome::Failed);
        assert_eq!(value["assignment"], "Plan a garden");
    }

    #[test]
    fn details_include_latest_scaffolding() {
        let mut machine = SessionMachine::new();
        started(&mut machine, "Plan a garden");
        assert!(!turn_report(&machine, 0).contains("Question:"));
        assert!(!details_report(&machine).contains("Question:"));

        machine.toggle_details();
        assert!(turn_report(&machine, 0).contains("Question: What do you already know?"));
        assert!(details_report(&machine).contains("Ready to move on: not yet"));
    }
}
