//! Label distribution summaries and prediction percentiles.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::labels::{LabelVector, MIDPOINT};

/// Percentiles logged after every deep prediction pass.
pub const REPORTED_PERCENTILES: [f32; 6] = [98.0, 97.0, 95.0, 90.0, 80.0, 70.0];

/// Counts of documents per certainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub documents: usize,
    /// Labels exactly 1.
    pub solid_positive: usize,
    /// Labels exactly 0.
    pub solid_negative: usize,
    pub neutral: usize,
    /// Neither solid nor neutral.
    pub undecided: usize,
    pub mean: f32,
}

impl LabelSummary {
    pub fn from_labels(labels: &LabelVector) -> Self {
        let documents = labels.len();
        let solid_positive = labels.count_positive();
        let solid_negative = labels.count_negative();
        let neutral = labels.count_neutral();
        let mean = labels.values().mean().unwrap_or(MIDPOINT);

        Self {
            documents,
            solid_positive,
            solid_negative,
            neutral,
            undecided: documents - solid_positive - solid_negative - neutral,
            mean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    pub rank: f32,
    pub value: f32,
}

/// Linear-interpolated percentiles of `values` at [`REPORTED_PERCENTILES`].
///
/// Empty input yields an empty vector.
pub fn prediction_percentiles(values: &Array1<f32>) -> Vec<Percentile> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let last = (sorted.len() - 1) as f32;

    REPORTED_PERCENTILES
        .iter()
        .map(|&rank| {
            let position = rank / 100.0 * last;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f32;
            let value = sorted[lower] + (sorted[upper] - sorted[lower]) * fraction;
            Percentile { rank, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn summary_partitions_the_corpus() {
        let labels = LabelVector::new(vec![0.0, 1.0, 1.0, 0.5, 0.7]).unwrap();
        let summary = LabelSummary::from_labels(&labels);
        assert_eq!(summary.documents, 5);
        assert_eq!(summary.solid_positive, 2);
        assert_eq!(summary.solid_negative, 1);
        assert_eq!(summary.neutral, 1);
        assert_eq!(summary.undecided, 1);
        assert!((summary.mean - 0.64).abs() < 1e-6);
    }

    #[test]
    fn empty_summary_defaults_to_midpoint_mean() {
        let summary = LabelSummary::from_labels(&LabelVector::neutral(0));
        assert_eq!(summary.documents, 0);
        assert_eq!(summary.mean, MIDPOINT);
    }

    #[test]
    fn percentiles_interpolate() {
        let values = Array1::from_iter((0..=100).map(|v| v as f32 / 100.0));
        let percentiles = prediction_percentiles(&values);
        assert_eq!(percentiles.len(), REPORTED_PERCENTILES.len());
        assert!((percentiles[0].value - 0.98).abs() < 1e-5);
        assert!((percentiles[5].value - 0.70).abs() < 1e-5);
    }

    #[test]
    fn percentiles_of_a_single_value() {
        let percentiles = prediction_percentiles(&array![0.4]);
        assert!(percentiles.iter().all(|p| p.value == 0.4));
    }

    #[test]
    fn percentiles_of_nothing() {
        assert!(prediction_percentiles(&Array1::zeros(0)).is_empty());
    }
}
