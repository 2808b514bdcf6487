//! Capabilities a classifier needs to take part in reinforcement.
//!
//! The loops are written once against these traits. Two shapes exist:
//! - [`SparseFeatureLearner`]: fits on the current labels and emits per-term
//!   evidence matrices whose shifts are rate limited and merged by consensus.
//! - [`SequenceLearner`]: trains from a [`LabeledSource`] that reflects the
//!   latest labels and predicts a dense score for every document.
//!
//! [`TermAssociationLearner`] and [`LogisticLearner`] are small reference
//! implementations of each shape.

pub mod logistic;
pub mod source;
pub mod term;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::LabelResult;
use crate::evidence::TermEvidence;
use crate::labels::LabelVector;

pub use logistic::{LogisticConfig, LogisticLearner};
pub use source::DenseSource;
pub use term::{TermAssociationConfig, TermAssociationLearner};

/// Learner over sparse lexical features.
///
/// `Send` so that independent learners can fit in parallel within a round.
pub trait SparseFeatureLearner: Send {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    fn set_current_labels(&mut self, labels: &LabelVector);

    /// Documents the next `fit` may train on.
    fn set_training_mask(&mut self, mask: &Array1<bool>);

    fn fit(&mut self) -> LabelResult<()>;

    /// Evidence for positive and negative shifts, features in priority order.
    fn term_evidence(&self) -> LabelResult<TermEvidence>;
}

/// Iteration mode of a [`LabeledSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageMode {
    /// Only documents inside the training mask, with their current labels.
    #[default]
    Training,
    /// Every document, in index order.
    Inference,
}

/// Labelled data stream feeding a [`SequenceLearner`].
pub trait LabeledSource {
    /// Total number of documents, regardless of mode or mask.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update_labels(&mut self, labels: &LabelVector);

    fn set_mask(&mut self, mask: &Array1<bool>);

    fn set_usage_mode(&mut self, mode: UsageMode);
}

/// Dense learner trained from a live labelled source.
pub trait SequenceLearner {
    type Source: LabeledSource;

    /// Train for `steps` batches drawn from `source` in training mode.
    fn fit(&mut self, source: &mut Self::Source, steps: usize) -> LabelResult<()>;

    /// Score every document of `source` in inference mode.
    fn predict(&mut self, source: &mut Self::Source) -> LabelResult<Array1<f32>>;
}
