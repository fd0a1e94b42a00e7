//! # Scaffolding Purpose Lookup
//!
//! Maps a (phase, metacognition element) pair to the purpose a scaffolding
//! question serves at that point of the process.
//!
//! Resolution order:
//! 1. Exact match in the phase table.
//! 2. Generic description of the element.
//! 3. Empty string.
//!
//! The lookup never fails and has no side effects.

use crate::catalog::{MetacogElement, Phase};

/// Purpose of `element` within `phase`.
#[must_use]
pub fn phase_purpose(phase: Phase, element: MetacogElement) -> &'static str {
    match (phase, element) {
        (Phase::Understanding, MetacogElement::Monitoring) => {
            "Assess task characteristics · Predict performance"
        }
        (Phase::Understanding, MetacogElement::Control) => {
            "Decide on task engagement · Allocate resources"
        }
        (Phase::Understanding, MetacogElement::Knowledge) => {
            "Use prior experience · Recall similar problems solved"
        }
        (Phase::Ideation, MetacogElement::Monitoring) => {
            "Evaluate candidate ideas · Assess progress"
        }
        (Phase::Ideation, MetacogElement::Control) => "Select or switch strategies · Judge ideas",
        (Phase::Ideation, MetacogElement::Knowledge) => {
            "Retrieve metacognitive knowledge · Apply generation strategies"
        }
        (Phase::Preparation, MetacogElement::Monitoring) => {
            "Evaluate overall performance · Review creativity"
        }
        (Phase::Preparation, MetacogElement::Control) => {
            "Choose the creative idea · Decide on the solution"
        }
        (Phase::Preparation, MetacogElement::Knowledge) => {
            "Update metacognitive knowledge · Reflect on learning"
        }
    }
}

/// Purpose string for loosely-typed input, as it arrives from the backend.
///
/// `phase` may be a phase name, a phase key or a stage id; `element` may be a
/// backend tag or an English name.
#[must_use]
pub fn purpose_for(phase: &str, element: &str) -> &'static str {
    let Some(element) = MetacogElement::parse(element) else {
        return "";
    };
    match Phase::parse(phase) {
        Some(phase) => phase_purpose(phase, element),
        None => element.description(),
    }
}
