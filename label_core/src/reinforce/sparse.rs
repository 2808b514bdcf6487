//! Consensus loop over sparse feature learners.
//!
//! Per round every learner fits on the current labels (in parallel), its term
//! evidence is rate limited into a proposal, and consensus merges the
//! proposals into the next label vector.

use std::time::Instant;

use rayon::prelude::*;

use crate::analysis::LabelSummary;
use crate::config::{ConsensusConfig, ReinforcementConfig, SparseLoopConfig};
use crate::consensus::ConsensusResolver;
use crate::error::{LabelError, LabelResult};
use crate::labels::LabelVector;
use crate::learner::SparseFeatureLearner;
use crate::logging::RoundLogger;
use crate::rate_limit::term_rate_limit;
use crate::reinforce::{LoopKind, RoundReport};

/// Result of a sparse reinforcement run.
#[derive(Debug, Clone)]
pub struct SparseOutcome {
    pub labels: LabelVector,
    pub reports: Vec<RoundReport>,
    /// Round after which no shift was accepted, when early stopping fired.
    pub converged_round: Option<usize>,
}

pub struct SparseReinforcement {
    resolver: ConsensusResolver,
    config: SparseLoopConfig,
    logger: Option<RoundLogger>,
}

impl SparseReinforcement {
    pub fn new(consensus: ConsensusConfig, config: SparseLoopConfig) -> Self {
        Self {
            resolver: ConsensusResolver::new(consensus),
            config,
            logger: None,
        }
    }

    /// Build from a full configuration, opening the round log if one is set.
    pub fn from_config(config: &ReinforcementConfig) -> LabelResult<Self> {
        let mut engine = Self::new(config.consensus, config.sparse);
        if let Some(path) = &config.round_log {
            engine.logger = Some(RoundLogger::new(path)?);
        }
        Ok(engine)
    }

    pub fn with_logger(mut self, logger: RoundLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn run(
        &self,
        learners: &mut [Box<dyn SparseFeatureLearner>],
        labels: LabelVector,
    ) -> LabelResult<SparseOutcome> {
        let mut labels = labels;
        let mut reports = Vec::with_capacity(self.config.rounds);
        let mut converged_round = None;

        tracing::info!(
            "Starting sparse reinforcement: {} learners, {} documents, up to {} rounds",
            learners.len(),
            labels.len(),
            self.config.rounds
        );

        for round in 1..=self.config.rounds {
            let (next, report) = self.run_round(learners, &labels, round)?;
            labels = next;

            if let Some(logger) = &self.logger {
                logger.log_round(&report)?;
            }
            let settled = report.changed == 0;
            reports.push(report);

            if settled && self.config.stop_on_convergence {
                tracing::info!("No label changes in round {round}; stopping early");
                converged_round = Some(round);
                break;
            }
        }

        Ok(SparseOutcome {
            labels,
            reports,
            converged_round,
        })
    }

    /// Execute one round and return the committed labels with its report.
    pub fn run_round(
        &self,
        learners: &mut [Box<dyn SparseFeatureLearner>],
        current: &LabelVector,
        round: usize,
    ) -> LabelResult<(LabelVector, RoundReport)> {
        if learners.is_empty() {
            return Err(LabelError::invalid_input(
                "sparse reinforcement",
                "at least one learner is required",
            ));
        }
        let started = Instant::now();
        let mask = current.training_mask();

        learners.par_iter_mut().try_for_each(|learner| {
            learner.set_current_labels(current);
            learner.set_training_mask(&mask);
            learner.fit()
        })?;

        let increment = self.resolver.confidence_increment();
        let proposals = learners
            .iter()
            .map(|learner| {
                let evidence = learner.term_evidence()?;
                let bounded = term_rate_limit(&evidence.positive, &evidence.negative, current)?;
                tracing::debug!(
                    learner = learner.name(),
                    positive = bounded.shifts.positive_count(),
                    negative = bounded.shifts.negative_count(),
                    positive_boundary = bounded.positive_boundary,
                    negative_boundary = bounded.negative_boundary,
                    "Rate limited term evidence"
                );
                current.shifted(&bounded.shifts, increment)
            })
            .collect::<LabelResult<Vec<_>>>()?;

        let next = self.resolver.get_consensus(current, &proposals)?;

        let (positive_shifts, negative_shifts) = next
            .values()
            .iter()
            .zip(current.values().iter())
            .fold((0, 0), |(up, down), (after, before)| {
                if after > before {
                    (up + 1, down)
                } else if after < before {
                    (up, down + 1)
                } else {
                    (up, down)
                }
            });

        let report = RoundReport {
            kind: LoopKind::Sparse,
            round,
            positive_shifts,
            negative_shifts,
            changed: positive_shifts + negative_shifts,
            summary: LabelSummary::from_labels(&next),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Sparse round {}: +{} / -{} labels, {} solid positive, {} solid negative",
            round,
            report.positive_shifts,
            report.negative_shifts,
            report.summary.solid_positive,
            report.summary.solid_negative
        );

        Ok((next, report))
    }
}
