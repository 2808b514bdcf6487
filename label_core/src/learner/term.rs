//! Term association learner for sparse lexical features.
//!
//! Every term is scored by the mean label of the training documents that
//! contain it. Strongly positive and strongly negative terms become the
//! columns of the evidence matrices, strongest first, so the rate limiter
//! admits documents matched by the most telling terms before the rest. Rows
//! of documents already at 0 or 1 are dropped from the evidence.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::evidence::{CscMatrix, TermEvidence};
use crate::labels::LabelVector;
use crate::learner::SparseFeatureLearner;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermAssociationConfig {
    /// Training documents a term must appear in before it is scored.
    pub min_document_frequency: usize,
    /// Terms scoring at or above this emit positive evidence.
    pub positive_cutoff: f32,
    /// Terms scoring at or below this emit negative evidence.
    pub negative_cutoff: f32,
}

impl Default for TermAssociationConfig {
    fn default() -> Self {
        Self {
            min_document_frequency: 2,
            positive_cutoff: 0.75,
            negative_cutoff: 0.25,
        }
    }
}

pub struct TermAssociationLearner {
    name: String,
    config: TermAssociationConfig,
    /// Documents × terms occurrence counts.
    documents: CscMatrix,
    labels: Option<LabelVector>,
    mask: Option<Array1<bool>>,
    scores: Option<Vec<Option<f32>>>,
}

impl TermAssociationLearner {
    pub fn new(
        name: impl Into<String>,
        documents: CscMatrix,
        config: TermAssociationConfig,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            documents,
            labels: None,
            mask: None,
            scores: None,
        }
    }

    /// Per-term score from the last fit; `None` for terms seen too rarely.
    pub fn scores(&self) -> Option<&[Option<f32>]> {
        self.scores.as_deref()
    }

    fn ranked_terms(&self, scores: &[Option<f32>], positive: bool) -> Vec<usize> {
        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .enumerate()
            .filter_map(|(term, score)| score.map(|s| (term, s)))
            .filter(|&(_, s)| {
                if positive {
                    s >= self.config.positive_cutoff
                } else {
                    s <= self.config.negative_cutoff
                }
            })
            .collect();

        if positive {
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        } else {
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        ranked.into_iter().map(|(term, _)| term).collect()
    }
}

impl SparseFeatureLearner for TermAssociationLearner {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_current_labels(&mut self, labels: &LabelVector) {
        self.labels = Some(labels.clone());
    }

    fn set_training_mask(&mut self, mask: &Array1<bool>) {
        self.mask = Some(mask.clone());
    }

    fn fit(&mut self) -> LabelResult<()> {
        let (rows, cols) = self.documents.shape();
        let labels = self
            .labels
            .as_ref()
            .ok_or_else(|| LabelError::learner(&self.name, "fit called before labels were set"))?;
        if labels.len() != rows {
            return Err(LabelError::learner(
                &self.name,
                format!("{} labels for {rows} documents", labels.len()),
            ));
        }
        let mask = match &self.mask {
            Some(mask) if mask.len() != rows => {
                return Err(LabelError::learner(
                    &self.name,
                    format!("training mask covers {} of {rows} documents", mask.len()),
                ));
            }
            Some(mask) => mask.clone(),
            None => labels.training_mask(),
        };

        let values = labels.values();
        let scores: Vec<Option<f32>> = (0..cols)
            .map(|term| {
                let (doc_ids, _) = self.documents.column(term);
                let (total, count) = doc_ids
                    .iter()
                    .filter(|&&doc| mask[doc])
                    .fold((0.0f32, 0usize), |(total, count), &doc| {
                        (total + values[doc], count + 1)
                    });
                (count >= self.config.min_document_frequency && count > 0)
                    .then(|| total / count as f32)
            })
            .collect();

        tracing::debug!(
            learner = %self.name,
            scored = scores.iter().filter(|s| s.is_some()).count(),
            terms = cols,
            "Fitted term associations"
        );
        self.scores = Some(scores);
        Ok(())
    }

    fn term_evidence(&self) -> LabelResult<TermEvidence> {
        let (scores, labels) = match (&self.scores, &self.labels) {
            (Some(scores), Some(labels)) => (scores, labels),
            _ => {
                return Err(LabelError::learner(
                    &self.name,
                    "evidence requested before fit",
                ))
            }
        };

        // Solid documents cannot move, so they must not consume the budget.
        let movable = labels.non_solid_mask();
        let positive = self
            .documents
            .select_columns(&self.ranked_terms(scores, true))?
            .retain_rows(&movable)?;
        let negative = self
            .documents
            .select_columns(&self.ranked_terms(scores, false))?
            .retain_rows(&movable)?;
        Ok(TermEvidence::new(positive, negative))
    }
}
