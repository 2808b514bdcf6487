//! Agreement between predictions and human annotations.
//!
//! Annotations arrive as vote tallies. A document counts as validated once
//! either side has at least `min_votes`, and its truth is positive when the
//! positive side reaches `min_votes`. Predictions above the midpoint count as
//! positive.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::labels::MIDPOINT;

/// Vote tally for one annotated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorVotes {
    pub negative: u32,
    pub positive: u32,
}

impl AnnotatorVotes {
    pub fn new(negative: u32, positive: u32) -> Self {
        Self { negative, positive }
    }

    fn is_validated(&self, min_votes: u32) -> bool {
        self.negative >= min_votes || self.positive >= min_votes
    }

    fn is_positive(&self, min_votes: u32) -> bool {
        self.positive >= min_votes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionComparison {
    /// Annotated documents, validated or not.
    pub total: usize,
    pub correct: usize,
    pub validated_total: usize,
    pub validated_correct: usize,
    /// Validated documents predicted positive but annotated negative.
    pub false_positives: Vec<usize>,
    /// Validated documents predicted negative but annotated positive.
    pub false_negatives: Vec<usize>,
}

impl PredictionComparison {
    pub fn accuracy(&self) -> f32 {
        ratio(self.correct, self.total)
    }

    pub fn validated_accuracy(&self) -> f32 {
        ratio(self.validated_correct, self.validated_total)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Compare `predictions` against annotations of the first documents.
///
/// Annotations cover a prefix of the corpus; predictions beyond it are
/// ignored.
pub fn compare_predictions(
    predictions: &Array1<f32>,
    annotations: &[AnnotatorVotes],
    min_votes: u32,
) -> LabelResult<PredictionComparison> {
    if predictions.len() < annotations.len() {
        return Err(LabelError::invalid_input(
            "prediction comparison",
            format!(
                "{} annotations but only {} predictions",
                annotations.len(),
                predictions.len()
            ),
        ));
    }

    let mut comparison = PredictionComparison {
        total: annotations.len(),
        correct: 0,
        validated_total: 0,
        validated_correct: 0,
        false_positives: Vec::new(),
        false_negatives: Vec::new(),
    };

    for (index, votes) in annotations.iter().enumerate() {
        let truth = votes.is_positive(min_votes);
        let predicted = predictions[index] > MIDPOINT;
        let correct = truth == predicted;
        if correct {
            comparison.correct += 1;
        }

        if !votes.is_validated(min_votes) {
            continue;
        }
        comparison.validated_total += 1;
        match (truth, predicted) {
            (true, true) | (false, false) => comparison.validated_correct += 1,
            (false, true) => comparison.false_positives.push(index),
            (true, false) => comparison.false_negatives.push(index),
        }
    }

    tracing::info!(
        correct = comparison.correct,
        total = comparison.total,
        validated_correct = comparison.validated_correct,
        validated_total = comparison.validated_total,
        "Compared predictions against annotations"
    );
    Ok(comparison)
}
