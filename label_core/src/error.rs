//! Error types for label refinement.
//!
//! Input problems are surfaced to the caller immediately and never coerced.
//! [`LabelError::InvariantViolation`] is reserved for internal logic failures
//! and is fatal: the reinforcement loops propagate it without recovery.

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;

/// Result alias used throughout the crate.
pub type LabelResult<T> = Result<T, LabelError>;

#[derive(Debug, Error)]
pub enum LabelError {
    /// Caller supplied input that cannot be processed.
    #[error("invalid input for {context}: {reason}")]
    InvalidInput { context: String, reason: String },

    /// A matrix was passed in a representation the algorithm cannot walk.
    #[error("expected {expected} matrix, found {found}")]
    TypeConstraint {
        expected: &'static str,
        found: &'static str,
    },

    /// Column accumulation exhausted every column without reaching the cap.
    #[error(
        "rate limiter exhausted {cols} columns of a {rows}x{cols} matrix without \
         exceeding max_moves={max_moves} (accumulated {accumulated} rows)"
    )]
    InvariantViolation {
        rows: usize,
        cols: usize,
        max_moves: usize,
        accumulated: usize,
    },

    /// A learner failed to fit or predict; the run is aborted.
    #[error("learner '{learner}' failed: {reason}")]
    Learner { learner: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabelError {
    pub fn invalid_input(context: impl Into<String>, reason: impl Into<String>) -> Self {
        LabelError::InvalidInput {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn learner(learner: impl Into<String>, reason: impl Into<String>) -> Self {
        LabelError::Learner {
            learner: learner.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that indicate a broken precondition inside the crate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LabelError::InvariantViolation { .. })
    }
}
