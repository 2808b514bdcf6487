//! # Label Core
//!
//! Weak-supervision engine that grows a small set of confident document labels
//! into a labelled corpus. Several independently trained learners propose
//! label changes each round; the engine accepts only changes they agree on,
//! caps how many labels may change per round, and repeats.
//!
//! ## Quick Start
//!
//! ```rust
//! use label_core::{ConsensusConfig, ConsensusResolver, LabelVector};
//!
//! let current = LabelVector::new(vec![0.5, 0.5, 0.9, 0.1]).unwrap();
//! let a = LabelVector::new(vec![0.7, 0.5, 0.9, 0.1]).unwrap();
//! let b = LabelVector::new(vec![0.6, 0.3, 0.9, 0.1]).unwrap();
//!
//! let resolver = ConsensusResolver::new(ConsensusConfig { confidence_increment: 0.1 });
//! let next = resolver.get_consensus(&current, &[a, b]).unwrap();
//! assert!((next.values()[0] - 0.6).abs() < 1e-6);
//! assert!((next.values()[1] - 0.4).abs() < 1e-6);
//! ```
//!
//! ## Core Modules
//!
//! - [`labels`] - Label vectors and per-round shift masks
//! - [`consensus`] - Sign-agreement merge of learner proposals
//! - [`rate_limit`] - Per-round caps on label transitions
//! - [`reinforce`] - Sparse and deep reinforcement loops
//! - [`learner`] - Learner capability traits and reference learners
//! - [`config`] - Tunables via TOML
//! - [`logging`] - JSON line-delimited round logs

pub mod analysis;
pub mod checkpoint;
pub mod config;
pub mod consensus;
pub mod error;
pub mod evidence;
pub mod labels;
pub mod learner;
pub mod logging;
pub mod rate_limit;
pub mod reinforce;

pub use analysis::{
    compare_predictions, prediction_percentiles, AnnotatorVotes, LabelSummary, Percentile,
    PredictionComparison,
};
pub use checkpoint::{CheckpointError, Checkpointable};
pub use config::{
    ConfigError, ConsensusConfig, DeepLoopConfig, ReinforcementConfig, ShiftPolicy,
    SparseLoopConfig,
};
pub use consensus::ConsensusResolver;
pub use error::{LabelError, LabelResult};
pub use evidence::{CscMatrix, EvidenceMatrix, TermEvidence};
pub use labels::{LabelVector, ShiftMasks, MIDPOINT};
pub use learner::{
    DenseSource, LabeledSource, LogisticConfig, LogisticLearner, SequenceLearner,
    SparseFeatureLearner, TermAssociationConfig, TermAssociationLearner, UsageMode,
};
pub use logging::{RoundLogEntry, RoundLogger};
pub use rate_limit::{compute_context_sums, deep_rate_limit, term_rate_limit, MoveBudget, TermShift};
pub use reinforce::{
    train_deep_learner, DeepOutcome, DeepReinforcement, LoopKind, RoundReport, SparseOutcome,
    SparseReinforcement,
};
