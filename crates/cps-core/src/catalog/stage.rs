//! # Stage Catalog
//!
//! The Creative Problem Solving process as the backend understands it:
//! six stages grouped into three phases, in a fixed order.
//!
//! ## Stage Definitions
//!
//! | # | Wire id | Stage | Phase |
//! |---|---------|-------|-------|
//! | 1 | `도전_이해_기회구성` | Constructing Opportunities | Understanding |
//! | 2 | `도전_이해_자료탐색` | Exploring Data | Understanding |
//! | 3 | `도전_이해_문제구조화` | Framing Problems | Understanding |
//! | 4 | `아이디어_생성` | Generating Ideas | Ideation |
//! | 5 | `실행_준비_해결책고안` | Developing Solutions | Preparation |
//! | 6 | `실행_준비_수용구축` | Building Acceptance | Preparation |
//!
//! ## Naming Scheme
//!
//! The composite stage ids above are canonical. Phase keys (`도전_이해`,
//! `아이디어_생성`, `실행_준비`) are accepted only where the backend is known
//! to use them: turn budgets and purpose lookup. `아이디어_생성` is both a
//! stage id and a phase key; the stage reading wins in [`Stage::from_id`].

use crate::types::CpsError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// PHASE ENUM
// =============================================================================

/// The three phases that group the CPS stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Understanding the challenge.
    Understanding,
    /// Generating ideas.
    Ideation,
    /// Preparing for action.
    Preparation,
}

impl Phase {
    /// All phases in process order.
    pub const ALL: [Phase; 3] = [Phase::Understanding, Phase::Ideation, Phase::Preparation];

    /// Lowercase English name, as used in JSON output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Understanding => "understanding",
            Phase::Ideation => "ideation",
            Phase::Preparation => "preparation",
        }
    }

    /// Backend key for this phase.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Phase::Understanding => "도전_이해",
            Phase::Ideation => "아이디어_생성",
            Phase::Preparation => "실행_준비",
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Understanding => "Understanding the Challenge",
            Phase::Ideation => "Generating Ideas",
            Phase::Preparation => "Preparing for Action",
        }
    }

    /// Stages of this phase, in process order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(move |s| s.phase() == *self)
    }

    /// Resolve a phase from its English name, its backend key, or any stage id
    /// belonging to it.
    #[must_use]
    pub fn parse(s: &str) -> Option<Phase> {
        let s = s.trim();
        if let Some(phase) = Phase::ALL
            .into_iter()
            .find(|p| p.key() == s || p.name().eq_ignore_ascii_case(s))
        {
            return Some(phase);
        }
        Stage::from_id(s).map(|stage| stage.phase())
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// STAGE ENUM
// =============================================================================

/// CPS stages, ordered as the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "도전_이해_기회구성")]
    ConstructingOpportunities,
    #[serde(rename = "도전_이해_자료탐색")]
    ExploringData,
    #[serde(rename = "도전_이해_문제구조화")]
    FramingProblems,
    #[serde(rename = "아이디어_생성")]
    GeneratingIdeas,
    #[serde(rename = "실행_준비_해결책고안")]
    DevelopingSolutions,
    #[serde(rename = "실행_준비_수용구축")]
    BuildingAcceptance,
}

impl Stage {
    /// The full catalog in process order.
    pub const ALL: [Stage; 6] = [
        Stage::ConstructingOpportunities,
        Stage::ExploringData,
        Stage::FramingProblems,
        Stage::GeneratingIdeas,
        Stage::DevelopingSolutions,
        Stage::BuildingAcceptance,
    ];

    /// Number of stages in the catalog.
    pub const COUNT: usize = Self::ALL.len();

    /// Backend identifier.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Stage::ConstructingOpportunities => "도전_이해_기회구성",
            Stage::ExploringData => "도전_이해_자료탐색",
            Stage::FramingProblems => "도전_이해_문제구조화",
            Stage::GeneratingIdeas => "아이디어_생성",
            Stage::DevelopingSolutions => "실행_준비_해결책고안",
            Stage::BuildingAcceptance => "실행_준비_수용구축",
        }
    }

    /// Look a stage up by backend identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Stage> {
        let id = id.trim();
        Stage::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ConstructingOpportunities => "Constructing Opportunities",
            Stage::ExploringData => "Exploring Data",
            Stage::FramingProblems => "Framing Problems",
            Stage::GeneratingIdeas => "Generating Ideas",
            Stage::DevelopingSolutions => "Developing Solutions",
            Stage::BuildingAcceptance => "Building Acceptance",
        }
    }

    /// Short label for compact progress displays.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            Stage::ConstructingOpportunities => "Opportunity",
            Stage::ExploringData => "Data",
            Stage::FramingProblems => "Framing",
            Stage::GeneratingIdeas => "Ideas",
            Stage::DevelopingSolutions => "Solutions",
            Stage::BuildingAcceptance => "Acceptance",
        }
    }

    /// Phase this stage belongs to.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Stage::ConstructingOpportunities | Stage::ExploringData | Stage::FramingProblems => {
                Phase::Understanding
            }
            Stage::GeneratingIdeas => Phase::Ideation,
            Stage::DevelopingSolutions | Stage::BuildingAcceptance => Phase::Preparation,
        }
    }

    /// Zero-based position in the catalog.
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.index().saturating_add(1)).copied()
    }

    /// Check if this stage is the last one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::BuildingAcceptance)
    }

    /// Message shown when the learner leaves this stage.
    #[must_use]
    pub fn completion_message(&self) -> &'static str {
        match self {
            Stage::ConstructingOpportunities => "You explored the opportunity thoroughly",
            Stage::ExploringData => "You gathered and examined the data well",
            Stage::FramingProblems => "You framed the problem clearly",
            Stage::GeneratingIdeas => "You generated a wide range of ideas",
            Stage::DevelopingSolutions => "You developed a workable solution",
            Stage::BuildingAcceptance => "You built a concrete action plan",
        }
    }

    /// Label of what comes after this stage.
    #[must_use]
    pub fn next_stage_label(&self) -> &'static str {
        self.next().map(|s| s.name()).unwrap_or("Complete")
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.phase().label(), self.name())
    }
}

impl FromStr for Stage {
    type Err = CpsError;

    /// Strict parse of a wire id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_id(s).ok_or_else(|| CpsError::UnknownStage(s.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
