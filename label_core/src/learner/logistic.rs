//! Logistic regression over dense document features.
//!
//! Trained by mini-batch gradient descent on binary cross-entropy against the
//! current soft labels, so partially confident labels pull proportionally.

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::learner::{DenseSource, SequenceLearner, UsageMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Feature dimension of every document row
    pub input_size: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    /// Random seed for weight initialization
    pub seed: u64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            input_size: 64,
            batch_size: 32,
            learning_rate: 0.5,
            seed: 42,
        }
    }
}

/// Single-layer sigmoid classifier implementing [`SequenceLearner`].
#[derive(Debug, Clone)]
pub struct LogisticLearner {
    config: LogisticConfig,
    weights: Array1<f32>,
    bias: f32,
}

impl LogisticLearner {
    pub fn new(config: LogisticConfig) -> Self {
        let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);

        // Xavier-style initialization
        let scale = (2.0 / config.input_size.max(1) as f32).sqrt();
        let weights = Array1::from_shape_fn(config.input_size, |_| {
            (rng.gen::<f32>() - 0.5) * 2.0 * scale
        });

        Self {
            config,
            weights,
            bias: 0.0,
        }
    }

    pub fn weights(&self) -> &Array1<f32> {
        &self.weights
    }

    fn forward(&self, features: &Array2<f32>) -> LabelResult<Array1<f32>> {
        if features.ncols() != self.config.input_size {
            return Err(LabelError::learner(
                "logistic",
                format!(
                    "features have {} columns, model expects {}",
                    features.ncols(),
                    self.config.input_size
                ),
            ));
        }
        let logits = features.dot(&self.weights) + self.bias;
        Ok(logits.mapv(sigmoid))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl SequenceLearner for LogisticLearner {
    type Source = DenseSource;

    fn fit(&mut self, source: &mut DenseSource, steps: usize) -> LabelResult<()> {
        for _ in 0..steps {
            let Some((batch, targets)) = source.next_batch(self.config.batch_size)? else {
                tracing::debug!("No training documents inside the mask; skipping fit");
                return Ok(());
            };

            let predictions = self.forward(&batch)?;
            // d(BCE)/d(logit) = p - y
            let error = &predictions - &targets;
            let n = batch.nrows() as f32;

            let grad_w = batch.t().dot(&error) / n;
            let grad_b = error.sum() / n;

            self.weights = &self.weights - &(grad_w * self.config.learning_rate);
            self.bias -= grad_b * self.config.learning_rate;
        }
        Ok(())
    }

    fn predict(&mut self, source: &mut DenseSource) -> LabelResult<Array1<f32>> {
        if source.mode() != UsageMode::Inference {
            return Err(LabelError::learner(
                "logistic",
                "predict requires the source in inference mode",
            ));
        }
        self.forward(source.features())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelVector;
    use crate::learner::LabeledSource;
    use ndarray::array;

    fn separable_source() -> DenseSource {
        let features = array![[1.0, 0.0], [0.9, 0.1], [0.0, 1.0], [0.1, 0.9]];
        let mut source = DenseSource::new(features);
        source.update_labels(&LabelVector::new(vec![1.0, 1.0, 0.0, 0.0]).unwrap());
        source
    }

    fn learner() -> LogisticLearner {
        LogisticLearner::new(LogisticConfig {
            input_size: 2,
            batch_size: 4,
            learning_rate: 1.0,
            seed: 7,
        })
    }

    #[test]
    fn learns_a_separable_split() {
        let mut source = separable_source();
        let mut model = learner();

        model.fit(&mut source, 300).unwrap();
        source.set_usage_mode(UsageMode::Inference);
        let predictions = model.predict(&mut source).unwrap();

        assert_eq!(predictions.len(), 4);
        assert!(predictions[0] > 0.8 && predictions[1] > 0.8);
        assert!(predictions[2] < 0.2 && predictions[3] < 0.2);
    }

    #[test]
    fn predict_requires_inference_mode() {
        let mut source = separable_source();
        assert!(learner().predict(&mut source).is_err());
    }

    #[test]
    fn rejects_feature_width_mismatch() {
        let mut source = DenseSource::new(array![[1.0, 2.0, 3.0]]);
        source.set_usage_mode(UsageMode::Inference);
        let result = learner().predict(&mut source);
        assert!(matches!(result, Err(LabelError::Learner { .. })));
    }

    #[test]
    fn initialization_is_seeded() {
        assert_eq!(learner().weights(), learner().weights());
    }
}
