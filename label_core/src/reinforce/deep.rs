//! Threshold reinforcement driven by a sequence learner.
//!
//! Each round the source is refreshed with the latest labels, the learner
//! fits on non-neutral documents only, and its predictions over the whole
//! corpus push confident documents by `label_modifier`. Whether the number of
//! shifts is capped is decided by [`ShiftPolicy`].

use std::time::Instant;

use ndarray::Array1;

use crate::analysis::{prediction_percentiles, LabelSummary};
use crate::config::{DeepLoopConfig, ReinforcementConfig, ShiftPolicy};
use crate::error::{LabelError, LabelResult};
use crate::labels::vector::clamp_unit;
use crate::labels::{LabelVector, ShiftMasks};
use crate::learner::{LabeledSource, SequenceLearner, UsageMode};
use crate::logging::RoundLogger;
use crate::rate_limit::deep_rate_limit;
use crate::reinforce::{LoopKind, RoundReport};

/// Result of a deep reinforcement run.
#[derive(Debug)]
pub struct DeepOutcome<L> {
    pub model: L,
    pub labels: LabelVector,
    /// Raw predictions of the last round, before clamping. `None` when no
    /// round ran.
    pub predictions: Option<Array1<f32>>,
    pub reports: Vec<RoundReport>,
}

pub struct DeepReinforcement {
    config: DeepLoopConfig,
    logger: Option<RoundLogger>,
}

impl DeepReinforcement {
    pub fn new(config: DeepLoopConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    /// Build from a full configuration, opening the round log if one is set.
    pub fn from_config(config: &ReinforcementConfig) -> LabelResult<Self> {
        let mut engine = Self::new(config.deep);
        if let Some(path) = &config.round_log {
            engine.logger = Some(RoundLogger::new(path)?);
        }
        Ok(engine)
    }

    pub fn with_logger(mut self, logger: RoundLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn train<L: SequenceLearner>(
        &self,
        mut model: L,
        current_labels: &LabelVector,
        data_source: &mut L::Source,
    ) -> LabelResult<DeepOutcome<L>> {
        let config = &self.config;
        if config.batch_size == 0 {
            return Err(LabelError::invalid_input(
                "deep reinforcement",
                "batch_size must be non-zero",
            ));
        }
        if data_source.len() != current_labels.len() {
            return Err(LabelError::invalid_input(
                "deep reinforcement",
                format!(
                    "data source holds {} documents, labels cover {}",
                    data_source.len(),
                    current_labels.len()
                ),
            ));
        }

        let positive_threshold = config.min_confidence;
        let negative_threshold = 1.0 - config.min_confidence;
        let steps = config.steps_per_round();

        let mut labels = current_labels.clone();
        let mut predictions = None;
        let mut reports = Vec::with_capacity(config.rounds);

        for round in 1..=config.rounds {
            let started = Instant::now();

            data_source.update_labels(&labels);
            data_source.set_mask(&labels.training_mask());

            data_source.set_usage_mode(UsageMode::Training);
            model.fit(data_source, steps)?;

            data_source.set_usage_mode(UsageMode::Inference);
            let raw = model.predict(data_source)?;
            if raw.len() != labels.len() {
                return Err(LabelError::invalid_input(
                    "deep reinforcement",
                    format!("{} predictions for {} labels", raw.len(), labels.len()),
                ));
            }

            let bounded = raw.mapv(clamp_unit);
            for percentile in prediction_percentiles(&bounded) {
                tracing::debug!(rank = percentile.rank, value = percentile.value, "Prediction percentile");
            }

            let shifts = match config.shift_policy {
                ShiftPolicy::Unbounded => ShiftMasks::new(
                    bounded.mapv(|p| p > positive_threshold),
                    bounded.mapv(|p| p < negative_threshold),
                )?,
                ShiftPolicy::RateLimited => {
                    deep_rate_limit(&bounded, &labels, config.min_confidence)?
                }
            };
            let next = labels.shifted(&shifts, config.label_modifier)?;

            let report = RoundReport {
                kind: LoopKind::Deep,
                round,
                positive_shifts: shifts.positive_count(),
                negative_shifts: shifts.negative_count(),
                changed: next.changed_count(&labels),
                summary: LabelSummary::from_labels(&next),
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            tracing::info!(
                "{} classified in deep training round {}",
                report.positive_shifts + report.negative_shifts,
                round
            );
            if let Some(logger) = &self.logger {
                logger.log_round(&report)?;
            }

            labels = next;
            predictions = Some(raw);
            reports.push(report);
        }

        Ok(DeepOutcome {
            model,
            labels,
            predictions,
            reports,
        })
    }
}

/// Run `config.rounds` rounds of deep reinforcement without a round log.
pub fn train_deep_learner<L: SequenceLearner>(
    model: L,
    current_labels: &LabelVector,
    data_source: &mut L::Source,
    config: &DeepLoopConfig,
) -> LabelResult<DeepOutcome<L>> {
    DeepReinforcement::new(*config).train(model, current_labels, data_source)
}
