//! Reinforcement configuration via TOML files.
//!
//! Every tunable of the consensus step and of both reinforcement loops is
//! carried in an explicit value handed to the component that uses it. Missing
//! sections and keys fall back to documented defaults.
//!
//! ```toml
//! [consensus]
//! confidence_increment = 0.1
//!
//! [sparse]
//! rounds = 5
//! stop_on_convergence = true
//!
//! [deep]
//! rounds = 2
//! training_documents = 250000
//! batch_size = 32
//! min_confidence = 0.985
//! label_modifier = 0.4
//! shift_policy = "rate_limited"
//!
//! [logging]
//! round_log = "logs/rounds.jsonl"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Complete configuration for a labelling run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReinforcementConfig {
    pub consensus: ConsensusConfig,
    pub sparse: SparseLoopConfig,
    pub deep: DeepLoopConfig,
    /// JSONL file receiving one entry per round, if set.
    pub round_log: Option<PathBuf>,
}

impl ReinforcementConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawReinforcementConfig =
            toml::from_str(toml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;

        Ok(Self {
            consensus: ConsensusConfig::try_from(&raw.consensus)?,
            sparse: SparseLoopConfig::try_from(&raw.sparse)?,
            deep: DeepLoopConfig::try_from(&raw.deep)?,
            round_log: raw.logging.round_log,
        })
    }
}

/// Step size used when consensus accepts a shift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsensusConfig {
    pub confidence_increment: f32,
}

impl ConsensusConfig {
    fn try_from(raw: &RawConsensus) -> Result<Self, ConfigError> {
        if !raw.confidence_increment.is_finite()
            || raw.confidence_increment <= 0.0
            || raw.confidence_increment > 1.0
        {
            return Err(ConfigError::Parse(
                "consensus.confidence_increment must be in (0, 1]".into(),
            ));
        }

        Ok(Self {
            confidence_increment: raw.confidence_increment,
        })
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            confidence_increment: default_confidence_increment(),
        }
    }
}

/// Termination settings for the sparse learner loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SparseLoopConfig {
    /// Upper bound on the number of rounds.
    pub rounds: usize,
    /// Stop early after the first round in which consensus accepts no shift.
    pub stop_on_convergence: bool,
}

impl SparseLoopConfig {
    fn try_from(raw: &RawSparse) -> Result<Self, ConfigError> {
        Ok(Self {
            rounds: raw.rounds,
            stop_on_convergence: raw.stop_on_convergence,
        })
    }
}

impl Default for SparseLoopConfig {
    fn default() -> Self {
        Self {
            rounds: default_sparse_rounds(),
            stop_on_convergence: true,
        }
    }
}

/// Whether the deep loop caps the number of label transitions per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPolicy {
    /// Every prediction past a threshold shifts its label.
    #[default]
    Unbounded,
    /// Shifts go through the deep rate limiter.
    RateLimited,
}

/// Tunables of the sequence learner loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeepLoopConfig {
    pub rounds: usize,
    /// Documents drawn per round; divided by `batch_size` to get fit steps.
    pub training_documents: usize,
    pub batch_size: usize,
    /// Prediction above which a document counts as positive. The negative
    /// threshold is `1 - min_confidence`.
    pub min_confidence: f32,
    pub label_modifier: f32,
    pub shift_policy: ShiftPolicy,
}

impl DeepLoopConfig {
    /// Fit steps per round.
    pub fn steps_per_round(&self) -> usize {
        self.training_documents / self.batch_size
    }

    fn try_from(raw: &RawDeep) -> Result<Self, ConfigError> {
        if raw.batch_size == 0 {
            return Err(ConfigError::Parse("deep.batch_size must be non-zero".into()));
        }
        if !raw.min_confidence.is_finite() || raw.min_confidence <= 0.5 || raw.min_confidence >= 1.0
        {
            return Err(ConfigError::Parse(
                "deep.min_confidence must be in (0.5, 1)".into(),
            ));
        }
        if !raw.label_modifier.is_finite() || raw.label_modifier <= 0.0 || raw.label_modifier > 1.0
        {
            return Err(ConfigError::Parse(
                "deep.label_modifier must be in (0, 1]".into(),
            ));
        }

        Ok(Self {
            rounds: raw.rounds,
            training_documents: raw.training_documents,
            batch_size: raw.batch_size,
            min_confidence: raw.min_confidence,
            label_modifier: raw.label_modifier,
            shift_policy: raw.shift_policy,
        })
    }
}

impl Default for DeepLoopConfig {
    fn default() -> Self {
        Self {
            rounds: default_deep_rounds(),
            training_documents: default_training_documents(),
            batch_size: default_batch_size(),
            min_confidence: default_min_confidence(),
            label_modifier: default_label_modifier(),
            shift_policy: ShiftPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawReinforcementConfig {
    #[serde(default)]
    consensus: RawConsensus,
    #[serde(default)]
    sparse: RawSparse,
    #[serde(default)]
    deep: RawDeep,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Deserialize)]
struct RawConsensus {
    #[serde(default = "default_confidence_increment")]
    confidence_increment: f32,
}

impl Default for RawConsensus {
    fn default() -> Self {
        Self {
            confidence_increment: default_confidence_increment(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSparse {
    #[serde(default = "default_sparse_rounds")]
    rounds: usize,
    #[serde(default = "default_true")]
    stop_on_convergence: bool,
}

impl Default for RawSparse {
    fn default() -> Self {
        Self {
            rounds: default_sparse_rounds(),
            stop_on_convergence: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDeep {
    #[serde(default = "default_deep_rounds")]
    rounds: usize,
    #[serde(default = "default_training_documents")]
    training_documents: usize,
    #[serde(default = "default_batch_size")]
    batch_size: usize,
    #[serde(default = "default_min_confidence")]
    min_confidence: f32,
    #[serde(default = "default_label_modifier")]
    label_modifier: f32,
    #[serde(default)]
    shift_policy: ShiftPolicy,
}

impl Default for RawDeep {
    fn default() -> Self {
        Self {
            rounds: default_deep_rounds(),
            training_documents: default_training_documents(),
            batch_size: default_batch_size(),
            min_confidence: default_min_confidence(),
            label_modifier: default_label_modifier(),
            shift_policy: ShiftPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    #[serde(default)]
    round_log: Option<PathBuf>,
}

fn default_confidence_increment() -> f32 {
    0.1
}

fn default_sparse_rounds() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_deep_rounds() -> usize {
    2
}

fn default_training_documents() -> usize {
    250_000
}

fn default_batch_size() -> usize {
    32
}

fn default_min_confidence() -> f32 {
    0.985
}

fn default_label_modifier() -> f32 {
    0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let config = ReinforcementConfig::from_str("").unwrap();
        assert!((config.consensus.confidence_increment - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.sparse.rounds, 5);
        assert!(config.sparse.stop_on_convergence);
        assert_eq!(config.deep.rounds, 2);
        assert_eq!(config.deep.training_documents, 250_000);
        assert_eq!(config.deep.batch_size, 32);
        assert!((config.deep.min_confidence - 0.985).abs() < f32::EPSILON);
        assert!((config.deep.label_modifier - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.deep.shift_policy, ShiftPolicy::Unbounded);
        assert!(config.round_log.is_none());
    }

    #[test]
    fn parses_custom_values() {
        let toml = "[consensus]\nconfidence_increment = 0.05\n\
                    [sparse]\nrounds = 9\nstop_on_convergence = false\n\
                    [deep]\nrounds = 3\ntraining_documents = 1000\nbatch_size = 64\n\
                    min_confidence = 0.9\nlabel_modifier = 0.25\nshift_policy = \"rate_limited\"\n\
                    [logging]\nround_log = \"logs/rounds.jsonl\"";
        let config = ReinforcementConfig::from_str(toml).unwrap();
        assert!((config.consensus.confidence_increment - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.sparse.rounds, 9);
        assert!(!config.sparse.stop_on_convergence);
        assert_eq!(config.deep.rounds, 3);
        assert_eq!(config.deep.steps_per_round(), 15);
        assert_eq!(config.deep.shift_policy, ShiftPolicy::RateLimited);
        assert_eq!(
            config.round_log.as_deref(),
            Some(Path::new("logs/rounds.jsonl"))
        );
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = ReinforcementConfig::from_str("[deep]\nbatch_size = 0").unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn rejects_out_of_range_increment() {
        assert!(ReinforcementConfig::from_str("[consensus]\nconfidence_increment = 1.5").is_err());
        assert!(ReinforcementConfig::from_str("[consensus]\nconfidence_increment = 0.0").is_err());
    }

    #[test]
    fn rejects_min_confidence_below_midpoint() {
        assert!(ReinforcementConfig::from_str("[deep]\nmin_confidence = 0.4").is_err());
    }

    #[test]
    fn steps_per_round_floors() {
        let config = DeepLoopConfig {
            training_documents: 100,
            batch_size: 32,
            ..DeepLoopConfig::default()
        };
        assert_eq!(config.steps_per_round(), 3);
    }
}
