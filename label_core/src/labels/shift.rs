use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};

/// Documents selected to move up or down in a single round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftMasks {
    pub positive: Array1<bool>,
    pub negative: Array1<bool>,
}

impl ShiftMasks {
    pub fn new(positive: Array1<bool>, negative: Array1<bool>) -> LabelResult<Self> {
        if positive.len() != negative.len() {
            return Err(LabelError::invalid_input(
                "shift masks",
                format!(
                    "positive mask has {} entries, negative mask has {}",
                    positive.len(),
                    negative.len()
                ),
            ));
        }
        Ok(Self { positive, negative })
    }

    /// Masks selecting nothing.
    pub fn empty(len: usize) -> Self {
        Self {
            positive: Array1::from_elem(len, false),
            negative: Array1::from_elem(len, false),
        }
    }

    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    pub fn positive_count(&self) -> usize {
        self.positive.iter().filter(|&&flag| flag).count()
    }

    pub fn negative_count(&self) -> usize {
        self.negative.iter().filter(|&&flag| flag).count()
    }

    /// Number of selected shifts in either direction.
    pub fn total(&self) -> usize {
        self.positive_count() + self.negative_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn counts_each_direction() {
        let masks = ShiftMasks::new(array![true, false, true], array![false, true, false]).unwrap();
        assert_eq!(masks.positive_count(), 2);
        assert_eq!(masks.negative_count(), 1);
        assert_eq!(masks.total(), 3);
    }

    #[test]
    fn rejects_mismatched_masks() {
        let result = ShiftMasks::new(array![true], array![false, true]);
        assert!(matches!(result, Err(LabelError::InvalidInput { .. })));
    }

    #[test]
    fn empty_selects_nothing() {
        let masks = ShiftMasks::empty(4);
        assert_eq!(masks.len(), 4);
        assert_eq!(masks.total(), 0);
    }
}
