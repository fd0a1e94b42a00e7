//! # Metacognition Tags
//!
//! The backend labels every agent turn with the metacognitive support it
//! gave (monitoring, control, knowledge) and grades the learner's answer
//! (shallow, medium, deep). Tags arrive as Korean strings; English names are
//! accepted too.

use serde::{Deserialize, Serialize};

// =============================================================================
// METACOGNITION ELEMENT
// =============================================================================

/// One of the three metacognition elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetacogElement {
    Monitoring,
    Control,
    Knowledge,
}

impl MetacogElement {
    pub const ALL: [MetacogElement; 3] = [
        MetacogElement::Monitoring,
        MetacogElement::Control,
        MetacogElement::Knowledge,
    ];

    /// Backend tag.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            MetacogElement::Monitoring => "점검",
            MetacogElement::Control => "조절",
            MetacogElement::Knowledge => "지식",
        }
    }

    /// Lowercase English name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            MetacogElement::Monitoring => "monitoring",
            MetacogElement::Control => "control",
            MetacogElement::Knowledge => "knowledge",
        }
    }

    /// Generic description, used when no phase-specific purpose applies.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            MetacogElement::Monitoring => "Evaluates the task and checks one's own performance",
            MetacogElement::Control => "Chooses strategies and regulates the task",
            MetacogElement::Knowledge => "Draws on prior experience and knowledge",
        }
    }

    /// Parse a backend tag or an English name.
    #[must_use]
    pub fn parse(s: &str) -> Option<MetacogElement> {
        let s = s.trim();
        MetacogElement::ALL
            .into_iter()
            .find(|e| e.tag() == s || e.name().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for MetacogElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RESPONSE DEPTH
// =============================================================================

/// Backend grading of how deeply the learner answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDepth {
    Shallow,
    Medium,
    Deep,
}

impl ResponseDepth {
    #[must_use]
    pub fn parse(s: &str) -> Option<ResponseDepth> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shallow" => Some(ResponseDepth::Shallow),
            "medium" => Some(ResponseDepth::Medium),
            "deep" => Some(ResponseDepth::Deep),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ResponseDepth::Shallow => "Brief answer",
            ResponseDepth::Medium => "Moderate depth",
            ResponseDepth::Deep => "Deep thinking",
        }
    }

    /// Encouragement shown next to the depth badge.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            ResponseDepth::Shallow => "Try giving a more specific answer",
            ResponseDepth::Medium => "Good! Can you think a little deeper?",
            ResponseDepth::Deep => "Excellent! You are thinking in depth",
        }
    }
}

impl std::fmt::Display for ResponseDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// METACOGNITION TALLY
// =============================================================================

/// Running count of metacognition tags seen during a session.
///
/// Counters only ever grow; saturating arithmetic prevents overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetacogTally {
    pub monitoring: u64,
    pub control: u64,
    pub knowledge: u64,
}

impl MetacogTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `element`.
    pub fn record(&mut self, element: MetacogElement) {
        let counter = match element {
            MetacogElement::Monitoring => &mut self.monitoring,
            MetacogElement::Control => &mut self.control,
            MetacogElement::Knowledge => &mut self.knowledge,
        };
        *counter = counter.saturating_add(1);
    }

    /// Count every recognised tag in `tags`; unknown tags are ignored.
    pub fn record_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        for element in tags.iter().filter_map(|t| MetacogElement::parse(t.as_ref())) {
            self.record(element);
        }
    }

    #[must_use]
    pub fn get(&self, element: MetacogElement) -> u64 {
        match element {
            MetacogElement::Monitoring => self.monitoring,
            MetacogElement::Control => self.control,
            MetacogElement::Knowledge => self.knowledge,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.monitoring
            .saturating_add(self.control)
            .saturating_add(self.knowledge)
    }
}
