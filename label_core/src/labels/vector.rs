//! The label vector shared by every round of reinforcement.
//!
//! Rounds never mutate a vector in place; each shift produces a new
//! [`LabelVector`], so a round boundary is the point where the next vector
//! replaces the previous one.

use std::path::Path;

use ndarray::{Array1, Zip};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::checkpoint::{read_versioned, write_versioned, CheckpointError, Checkpointable};
use crate::error::{LabelError, LabelResult};
use crate::labels::ShiftMasks;

/// Unknown / neutral label value.
pub const MIDPOINT: f32 = 0.5;

const LABEL_CHECKPOINT_VERSION: u32 = 1;

/// Ordered confidence scores, one per document, each in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelVector {
    values: Array1<f32>,
}

impl LabelVector {
    /// Build a vector, rejecting values outside `[0, 1]` and NaN.
    pub fn new(values: Vec<f32>) -> LabelResult<Self> {
        Self::from_array(Array1::from(values))
    }

    pub fn from_array(values: Array1<f32>) -> LabelResult<Self> {
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(LabelError::invalid_input(
                "label vector",
                format!("label {index} is {value}, expected a value in [0, 1]"),
            ));
        }
        Ok(Self { values })
    }

    /// Every document at the unknown midpoint.
    pub fn neutral(len: usize) -> Self {
        Self {
            values: Array1::from_elem(len, MIDPOINT),
        }
    }

    /// Build from arbitrary values, saturating them into `[0, 1]`.
    pub(crate) fn clamped(mut values: Array1<f32>) -> Self {
        values.mapv_inplace(clamp_unit);
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<f32> {
        &self.values
    }

    pub fn into_inner(self) -> Array1<f32> {
        self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Documents not yet pinned at 0 or 1.
    pub fn non_solid_mask(&self) -> Array1<bool> {
        self.values.mapv(|v| (MIDPOINT - v).abs() < MIDPOINT)
    }

    /// Documents a learner may train on: everything except the midpoint.
    pub fn training_mask(&self) -> Array1<bool> {
        self.values.mapv(|v| v != MIDPOINT)
    }

    /// Documents labelled exactly 1.
    pub fn count_positive(&self) -> usize {
        self.values.iter().filter(|&&v| v == 1.0).count()
    }

    /// Documents labelled exactly 0.
    pub fn count_negative(&self) -> usize {
        self.values.iter().filter(|&&v| v == 0.0).count()
    }

    pub fn count_neutral(&self) -> usize {
        self.values.iter().filter(|&&v| v == MIDPOINT).count()
    }

    /// Apply `amount` upward on positive shifts and downward on negative
    /// shifts, returning a new clamped vector.
    pub fn shifted(&self, shifts: &ShiftMasks, amount: f32) -> LabelResult<Self> {
        if shifts.len() != self.len() {
            return Err(LabelError::invalid_input(
                "label shift",
                format!(
                    "shift masks cover {} documents, labels cover {}",
                    shifts.len(),
                    self.len()
                ),
            ));
        }

        let mut values = self.values.clone();
        Zip::from(&mut values)
            .and(&shifts.positive)
            .and(&shifts.negative)
            .for_each(|value, &up, &down| {
                if up {
                    *value += amount;
                }
                if down {
                    *value -= amount;
                }
                *value = clamp_unit(*value);
            });

        Ok(Self { values })
    }

    /// Number of documents whose label differs from `other`.
    pub fn changed_count(&self, other: &LabelVector) -> usize {
        self.values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Deterministic sample of non-neutral document indices, sorted.
    ///
    /// Used to spot-check the initial confident labels by hand. Returns every
    /// non-neutral index when fewer than `count` exist.
    pub fn sample_non_neutral(&self, count: usize, seed: u64) -> Vec<usize> {
        let candidates: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != MIDPOINT)
            .map(|(index, _)| index)
            .collect();

        if candidates.len() <= count {
            return candidates;
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked: Vec<usize> = rand::seq::index::sample(&mut rng, candidates.len(), count)
            .into_iter()
            .map(|position| candidates[position])
            .collect();
        picked.sort_unstable();
        picked
    }
}

pub(crate) fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

impl Checkpointable for LabelVector {
    fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        write_versioned(path.as_ref(), LABEL_CHECKPOINT_VERSION, &self.values.to_vec())
    }

    fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let values: Vec<f32> = read_versioned(path.as_ref(), LABEL_CHECKPOINT_VERSION)?;
        LabelVector::new(values).map_err(|err| CheckpointError::InvalidFormat(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use uuid::Uuid;

    #[test]
    fn rejects_out_of_range_values() {
        assert!(LabelVector::new(vec![0.2, 1.2]).is_err());
        assert!(LabelVector::new(vec![-0.1]).is_err());
        assert!(LabelVector::new(vec![f32::NAN]).is_err());
        assert!(LabelVector::new(vec![0.0, 0.5, 1.0]).is_ok());
    }

    #[test]
    fn masks_follow_midpoint_and_solid_boundaries() {
        let labels = LabelVector::new(vec![0.0, 0.5, 0.9, 1.0]).unwrap();
        assert_eq!(labels.non_solid_mask(), array![false, true, true, false]);
        assert_eq!(labels.training_mask(), array![true, false, true, true]);
        assert_eq!(labels.count_positive(), 1);
        assert_eq!(labels.count_negative(), 1);
        assert_eq!(labels.count_neutral(), 1);
    }

    #[test]
    fn repeated_shifts_saturate_at_one() {
        let mut labels = LabelVector::new(vec![0.9, 0.05]).unwrap();
        let shifts = ShiftMasks::new(array![true, false], array![false, true]).unwrap();
        for _ in 0..5 {
            labels = labels.shifted(&shifts, 0.1).unwrap();
        }
        assert_eq!(labels.get(0), Some(1.0));
        assert_eq!(labels.get(1), Some(0.0));
    }

    #[test]
    fn shifted_leaves_original_untouched() {
        let labels = LabelVector::neutral(3);
        let shifts = ShiftMasks::new(array![true, false, false], array![false, false, true]).unwrap();
        let next = labels.shifted(&shifts, 0.2).unwrap();
        assert_eq!(labels, LabelVector::neutral(3));
        assert!((next.get(0).unwrap() - 0.7).abs() < 1e-6);
        assert!((next.get(2).unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(next.changed_count(&labels), 2);
    }

    #[test]
    fn shifted_rejects_wrong_length() {
        let labels = LabelVector::neutral(3);
        assert!(labels.shifted(&ShiftMasks::empty(2), 0.1).is_err());
    }

    #[test]
    fn sample_is_deterministic_and_non_neutral() {
        let values: Vec<f32> = (0..40)
            .map(|i| if i % 3 == 0 { 0.5 } else { (i % 2) as f32 })
            .collect();
        let labels = LabelVector::new(values).unwrap();

        let first = labels.sample_non_neutral(5, 7);
        let second = labels.sample_non_neutral(5, 7);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|&i| labels.get(i) != Some(MIDPOINT)));
    }

    #[test]
    fn sample_returns_everything_when_short() {
        let labels = LabelVector::new(vec![0.5, 1.0, 0.0]).unwrap();
        assert_eq!(labels.sample_non_neutral(10, 1), vec![1, 2]);
    }

    #[test]
    fn checkpoint_round_trip_preserves_labels() {
        let path = std::env::temp_dir().join(format!("labels-{}.bin", Uuid::new_v4()));
        let labels = LabelVector::new(vec![0.0, 0.25, 0.5, 1.0]).unwrap();

        labels.save_checkpoint(&path).expect("save checkpoint");
        let restored = LabelVector::load_checkpoint(&path).expect("load checkpoint");
        std::fs::remove_file(&path).ok();

        assert_eq!(restored, labels);
    }

    #[test]
    fn checkpoint_with_out_of_range_values_is_rejected() {
        let path = std::env::temp_dir().join(format!("labels-{}.bin", Uuid::new_v4()));
        write_versioned(&path, LABEL_CHECKPOINT_VERSION, &vec![0.5f32, 1.5]).unwrap();

        let result = LabelVector::load_checkpoint(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(CheckpointError::InvalidFormat(_))));
    }
}
