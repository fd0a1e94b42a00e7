//! # Conversation Turn Tracker
//!
//! Pure projection of the backend's per-stage turn budget onto what the
//! learner sees: how many turns are left and how urgent that is.
//!
//! | Remaining | Status |
//! |-----------|--------|
//! | 0 | `LimitReached` |
//! | 1..=2 | `Warning` |
//! | > 2 | `Normal` |
//!
//! Ratios are integer percentages. A budget with `max == 0` is a backend
//! configuration error and is reported as [`CpsError::InvalidTurnBudget`].

use crate::catalog::Stage;
use crate::types::{CpsError, TurnCount, TurnCounts};
use serde::{Deserialize, Serialize};

/// Remaining turns at or below which the tracker warns.
pub const WARNING_THRESHOLD: u32 = 2;

/// Urgency of the remaining turn budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnLevel {
    Normal,
    Warning,
    LimitReached,
}

impl TurnLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnLevel::Normal => "normal",
            TurnLevel::Warning => "warning",
            TurnLevel::LimitReached => "limit-reached",
        }
    }
}

impl std::fmt::Display for TurnLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection of one stage's turn budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStatus {
    pub current: u32,
    pub max: u32,
    pub remaining: u32,
    pub level: TurnLevel,
    /// `current * 100 / max`, clamped to 100.
    pub percent: u8,
}

impl TurnStatus {
    /// Project a single budget. `stage` only labels the error.
    pub fn from_count(count: TurnCount, stage: &str) -> Result<Self, CpsError> {
        if count.max == 0 {
            return Err(CpsError::InvalidTurnBudget {
                stage: stage.to_string(),
            });
        }

        let remaining = count.max.saturating_sub(count.current);
        let level = if remaining == 0 {
            TurnLevel::LimitReached
        } else if remaining <= WARNING_THRESHOLD {
            TurnLevel::Warning
        } else {
            TurnLevel::Normal
        };
        let percent = ((count.current as u64).saturating_mul(100) / (count.max as u64)).min(100);

        Ok(Self {
            current: count.current,
            max: count.max,
            remaining,
            level,
            percent: percent as u8,
        })
    }
}

/// Find the budget that applies to `stage`.
///
/// Tries the stage id first, then the stage's phase key.
#[must_use]
pub fn budget_for(counts: &TurnCounts, stage: Stage) -> Option<TurnCount> {
    counts
        .get(stage.id())
        .or_else(|| counts.get(stage.phase().key()))
        .copied()
}

/// Turn status for `stage`, or `None` if the backend sent no budget for it.
#[must_use]
pub fn turn_status(counts: &TurnCounts, stage: Stage) -> Option<Result<TurnStatus, CpsError>> {
    budget_for(counts, stage).map(|count| TurnStatus::from_count(count, stage.id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(current: u32, max: u32) -> TurnStatus {
        TurnStatus::from_count(TurnCount::new(current, max), "test").expect("valid budget")
    }

    #[test]
    fn two_left_warns() {
        let s = status(3, 5);
        assert_eq!(s.remaining, 2);
        assert_eq!(s.level, TurnLevel::Warning);
        assert_eq!(s.percent, 60);
    }

    #[test]
    fn exhausted_budget_reaches_limit() {
        let s = status(5, 5);
        assert_eq!(s.remaining, 0);
        assert_eq!(s.level, TurnLevel::LimitReached);
        assert_eq!(s.level.as_str(), "limit-reached");
        assert_eq!(s.percent, 100);
    }

    #[test]
    fn fresh_budget_is_normal() {
        let s = status(0, 5);
        assert_eq!(s.remaining, 5);
        assert_eq!(s.level, TurnLevel::Normal);
        assert_eq!(s.percent, 0);
    }

    #[test]
    fn overrun_clamps() {
        let s = status(7, 5);
        assert_eq!(s.remaining, 0);
        assert_eq!(s.percent, 100);
    }

    #[test]
    fn zero_max_is_an_error() {
        let err = TurnStatus::from_count(TurnCount::new(0, 0), "아이디어_생성");
        assert!(matches!(err, Err(CpsError::InvalidTurnBudget { .. })));
    }

    #[test]
    fn budget_falls_back_to_phase_key() {
        let mut counts = TurnCounts::new();
        counts.insert("도전_이해".to_string(), TurnCount::new(1, 6));
        counts.insert(Stage::DevelopingSolutions.id().to_string(), TurnCount::new(2, 4));

        assert_eq!(
            budget_for(&counts, Stage::ExploringData),
            Some(TurnCount::new(1, 6))
        );
        assert_eq!(
            budget_for(&counts, Stage::DevelopingSolutions),
            Some(TurnCount::new(2, 4))
        );
        assert!(turn_status(&counts, Stage::BuildingAcceptance).is_none());
    }
}
