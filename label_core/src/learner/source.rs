//! In-memory labelled source over dense document features.

use ndarray::{Array1, Array2, Axis};

use crate::error::{LabelError, LabelResult};
use crate::labels::{LabelVector, MIDPOINT};
use crate::learner::{LabeledSource, UsageMode};

/// Dense document features paired with the labels of the current round.
///
/// In training mode batches cycle over the masked documents; in inference
/// mode the whole corpus is visible.
#[derive(Debug, Clone)]
pub struct DenseSource {
    features: Array2<f32>,
    labels: Array1<f32>,
    mask: Array1<bool>,
    mode: UsageMode,
    cursor: usize,
}

impl DenseSource {
    /// One row of `features` per document; labels start neutral and every
    /// document is inside the mask.
    pub fn new(features: Array2<f32>) -> Self {
        let documents = features.nrows();
        Self {
            features,
            labels: Array1::from_elem(documents, MIDPOINT),
            mask: Array1::from_elem(documents, true),
            mode: UsageMode::default(),
            cursor: 0,
        }
    }

    pub fn mode(&self) -> UsageMode {
        self.mode
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<f32> {
        &self.labels
    }

    /// Number of documents a training pass can draw from.
    pub fn training_len(&self) -> usize {
        self.mask.iter().filter(|&&flag| flag).count()
    }

    /// Next training batch of at most `batch_size` masked documents.
    ///
    /// Returns `None` when no document is inside the mask.
    pub fn next_batch(
        &mut self,
        batch_size: usize,
    ) -> LabelResult<Option<(Array2<f32>, Array1<f32>)>> {
        if self.mode != UsageMode::Training {
            return Err(LabelError::invalid_input(
                "dense source",
                "batches are only drawn in training mode",
            ));
        }

        let eligible: Vec<usize> = self
            .mask
            .iter()
            .enumerate()
            .filter(|(_, &flag)| flag)
            .map(|(index, _)| index)
            .collect();
        if eligible.is_empty() || batch_size == 0 {
            return Ok(None);
        }

        let take = batch_size.min(eligible.len());
        let rows: Vec<usize> = (0..take)
            .map(|offset| eligible[(self.cursor + offset) % eligible.len()])
            .collect();
        self.cursor = (self.cursor + take) % eligible.len();

        let batch = self.features.select(Axis(0), &rows);
        let targets = Array1::from_iter(rows.iter().map(|&row| self.labels[row]));
        Ok(Some((batch, targets)))
    }
}

impl LabeledSource for DenseSource {
    fn len(&self) -> usize {
        self.features.nrows()
    }

    fn update_labels(&mut self, labels: &LabelVector) {
        self.labels = labels.values().clone();
    }

    fn set_mask(&mut self, mask: &Array1<bool>) {
        self.mask = mask.clone();
        self.cursor = 0;
    }

    fn set_usage_mode(&mut self, mode: UsageMode) {
        self.mode = mode;
    }
}
