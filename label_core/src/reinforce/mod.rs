//! Multi-round label reinforcement.
//!
//! Rounds are strictly sequential: each round fits on the labels committed by
//! the previous one and produces a fresh [`LabelVector`](crate::labels::LabelVector).
//! Any learner failure aborts the run; there is no skipped round.

pub mod deep;
pub mod sparse;

use serde::{Deserialize, Serialize};

use crate::analysis::LabelSummary;

pub use deep::{train_deep_learner, DeepOutcome, DeepReinforcement};
pub use sparse::{SparseOutcome, SparseReinforcement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    Sparse,
    Deep,
}

/// Convergence metrics for one committed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub kind: LoopKind,
    /// 1-based round number.
    pub round: usize,
    pub positive_shifts: usize,
    pub negative_shifts: usize,
    /// Documents whose label value changed.
    pub changed: usize,
    /// Label distribution after the round.
    pub summary: LabelSummary,
    pub elapsed_ms: u64,
}
