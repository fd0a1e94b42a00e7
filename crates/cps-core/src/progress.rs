//! # Progress Projection
//!
//! Where the learner stands in the process, grouped by phase for compact
//! display. Derived from the current stage and the completed-stage set only.

use crate::catalog::{Phase, Stage};
use serde::{Deserialize, Serialize};

/// Progress within one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub total: usize,
    pub completed: usize,
    /// The current stage belongs to this phase.
    pub is_active: bool,
    pub is_completed: bool,
    /// Not active and nothing completed yet.
    pub is_pending: bool,
}

/// Overall progress through the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressView {
    /// 1-based position of the current stage, `None` before the first answer.
    pub step: Option<usize>,
    pub total: usize,
    /// `step * 100 / total`, 0 without a current stage.
    pub percent: u8,
    pub phases: Vec<PhaseProgress>,
}

impl ProgressView {
    #[must_use]
    pub fn compute(current: Option<Stage>, completed: &[Stage]) -> Self {
        let total = Stage::COUNT;
        let step = current.map(|s| s.index().saturating_add(1));
        let percent = step
            .map(|n| (n.saturating_mul(100) / total).min(100) as u8)
            .unwrap_or(0);

        let phases = Phase::ALL
            .into_iter()
            .map(|phase| {
                let stages: Vec<Stage> = phase.stages().collect();
                let done = stages.iter().filter(|s| completed.contains(s)).count();
                let is_active = current.map(|s| s.phase() == phase).unwrap_or(false);
                PhaseProgress {
                    phase,
                    total: stages.len(),
                    completed: done,
                    is_active,
                    is_completed: done == stages.len(),
                    is_pending: !is_active && done == 0,
                }
            })
            .collect();

        Self {
            step,
            total,
            percent,
            phases,
        }
    }

    #[must_use]
    pub fn phase(&self, phase: Phase) -> Option<&PhaseProgress> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_started() {
        let view = ProgressView::compute(None, &[]);
        assert_eq!(view.step, None);
        assert_eq!(view.percent, 0);
        assert!(view.phases.iter().all(|p| p.is_pending));
    }

    #[test]
    fn mid_understanding() {
        let view = ProgressView::compute(
            Some(Stage::FramingProblems),
            &[Stage::ConstructingOpportunities, Stage::ExploringData],
        );
        assert_eq!(view.step, Some(3));
        assert_eq!(view.percent, 50);

        let understanding = view.phase(Phase::Understanding).expect("phase");
        assert!(understanding.is_active);
        assert_eq!(understanding.completed, 2);
        assert!(!understanding.is_completed);

        let ideation = view.phase(Phase::Ideation).expect("phase");
        assert!(ideation.is_pending);
    }

    #[test]
    fn final_stage() {
        let completed: Vec<Stage> = Stage::ALL[..5].to_vec();
        let view = ProgressView::compute(Some(Stage::BuildingAcceptance), &completed);
        assert_eq!(view.step, Some(6));
        assert_eq!(view.percent, 100);
        assert!(view.phase(Phase::Understanding).expect("phase").is_completed);
        assert!(view.phase(Phase::Ideation).expect("phase").is_completed);
        let preparation = view.phase(Phase::Preparation).expect("phase");
        assert!(preparation.is_active);
        assert_eq!(preparation.completed, 1);
    }
}
