//! Caps on how many labels may change category in one round.
//!
//! The budget for each direction is the number of documents already solid on
//! that side, so the volume of change grows only as the corpus becomes more
//! confidently labelled. Selection is deterministic: ties at the cap are
//! broken by document or column order, never randomly.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{LabelError, LabelResult};
use crate::evidence::EvidenceMatrix;
use crate::labels::{LabelVector, ShiftMasks};

/// Maximum number of new positive and negative transitions for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveBudget {
    pub positive: usize,
    pub negative: usize,
}

impl MoveBudget {
    pub fn from_labels(labels: &LabelVector) -> Self {
        Self {
            positive: labels.count_positive(),
            negative: labels.count_negative(),
        }
    }
}

/// Bounded shifts derived from sparse evidence, with the column reached in
/// each matrix before its cap was hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TermShift {
    pub shifts: ShiftMasks,
    pub positive_boundary: usize,
    pub negative_boundary: usize,
}

/// Select positive and negative candidates from dense predictions.
///
/// Positives are predictions above `threshold` that are not already 1;
/// negatives are predictions below `(1 - threshold) * 2` that are not already
/// 0. An over-full candidate set keeps its strongest members.
pub fn deep_rate_limit(
    predictions: &Array1<f32>,
    current: &LabelVector,
    threshold: f32,
) -> LabelResult<ShiftMasks> {
    if predictions.len() != current.len() {
        return Err(LabelError::invalid_input(
            "deep rate limit",
            format!(
                "{} predictions for {} labels",
                predictions.len(),
                current.len()
            ),
        ));
    }

    let budget = MoveBudget::from_labels(current);
    let negative_threshold = (1.0 - threshold) * 2.0;
    let labels = current.values();

    let positive_candidates: Vec<usize> = (0..predictions.len())
        .filter(|&i| predictions[i] > threshold && labels[i] != 1.0)
        .collect();
    let negative_candidates: Vec<usize> = (0..predictions.len())
        .filter(|&i| predictions[i] < negative_threshold && labels[i] != 0.0)
        .collect();

    let positive = keep_strongest(
        positive_candidates,
        budget.positive,
        predictions,
        Direction::Descending,
    );
    let negative = keep_strongest(
        negative_candidates,
        budget.negative,
        predictions,
        Direction::Ascending,
    );

    ShiftMasks::new(positive, negative)
}

#[derive(Clone, Copy)]
enum Direction {
    Ascending,
    Descending,
}

fn keep_strongest(
    mut candidates: Vec<usize>,
    cap: usize,
    predictions: &Array1<f32>,
    direction: Direction,
) -> Array1<bool> {
    let mut mask = Array1::from_elem(predictions.len(), false);
    if candidates.len() > cap {
        // Stable sort over index-ordered candidates keeps ties in index order.
        candidates.sort_by(|&a, &b| match direction {
            Direction::Descending => predictions[b].total_cmp(&predictions[a]),
            Direction::Ascending => predictions[a].total_cmp(&predictions[b]),
        });
        candidates.truncate(cap);
    }
    for index in candidates {
        mask[index] = true;
    }
    mask
}

/// Bound the shifts suggested by a learner's positive and negative evidence.
pub fn term_rate_limit(
    positive: &EvidenceMatrix,
    negative: &EvidenceMatrix,
    current: &LabelVector,
) -> LabelResult<TermShift> {
    for (name, matrix) in [("positive", positive), ("negative", negative)] {
        let (rows, _) = matrix.shape();
        if rows != current.len() {
            return Err(LabelError::invalid_input(
                "term rate limit",
                format!(
                    "{name} evidence has {rows} rows, labels cover {} documents",
                    current.len()
                ),
            ));
        }
    }

    let budget = MoveBudget::from_labels(current);
    let (positive_mask, positive_boundary) = compute_context_sums(positive, budget.positive)?;
    let (negative_mask, negative_boundary) = compute_context_sums(negative, budget.negative)?;

    Ok(TermShift {
        shifts: ShiftMasks::new(positive_mask, negative_mask)?,
        positive_boundary,
        negative_boundary,
    })
}

/// Select at most `max_moves` documents by walking features in column order.
///
/// Returns the selection mask and the column at which the cap was crossed.
/// When every document with evidence fits in the budget, all of them are
/// returned with the column count as boundary. At the crossing column only
/// as many newly covered documents are taken (in row order) as the budget
/// still allows.
pub fn compute_context_sums(
    matrix: &EvidenceMatrix,
    max_moves: usize,
) -> LabelResult<(Array1<bool>, usize)> {
    let csc = matrix.as_csc()?;
    let (rows, cols) = csc.shape();

    let contains_evidence = csc.row_sums().mapv(|sum| sum > 0);
    let pool = contains_evidence.iter().filter(|&&flag| flag).count();
    if pool <= max_moves {
        return Ok((contains_evidence, cols));
    }

    let mut sums: Array1<u64> = Array1::zeros(rows);
    let mut selected = Array1::from_elem(rows, false);
    let mut active = 0usize;

    for col in 0..cols {
        let (row_ids, counts) = csc.column(col);
        let mut newly_covered = Vec::new();
        for (&row, &count) in row_ids.iter().zip(counts) {
            let was_covered = sums[row] > 0;
            sums[row] += u64::from(count);
            if !was_covered && sums[row] > 0 {
                newly_covered.push(row);
            }
        }

        if active + newly_covered.len() > max_moves {
            for &row in newly_covered.iter().take(max_moves - active) {
                selected[row] = true;
            }
            return Ok((selected, col));
        }

        for row in newly_covered {
            selected[row] = true;
            active += 1;
        }
    }

    tracing::error!(
        rows,
        cols,
        max_moves,
        pool,
        accumulated = active,
        "column accumulation finished without crossing the move cap"
    );
    Err(LabelError::InvariantViolation {
        rows,
        cols,
        max_moves,
        accumulated: active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::CscMatrix;
    use ndarray::array;

    fn labels(values: &[f32]) -> LabelVector {
        LabelVector::new(values.to_vec()).unwrap()
    }

    fn count(mask: &Array1<bool>) -> usize {
        mask.iter().filter(|&&flag| flag).count()
    }

    #[test]
    fn budget_counts_solid_labels() {
        let budget = MoveBudget::from_labels(&labels(&[1.0, 1.0, 0.0, 0.5, 0.9]));
        assert_eq!(budget, MoveBudget { positive: 2, negative: 1 });
    }

    #[test]
    fn deep_limit_keeps_top_predictions() {
        // Two solid positives allow two new positives.
        let current = labels(&[1.0, 1.0, 0.5, 0.5, 0.5, 0.5]);
        let predictions = array![0.99, 0.99, 0.95, 0.99, 0.97, 0.96];

        let shifts = deep_rate_limit(&predictions, &current, 0.9).unwrap();
        assert_eq!(shifts.positive, array![false, false, false, true, true, false]);
        assert_eq!(shifts.positive_count(), 2);
    }

    #[test]
    fn deep_limit_keeps_lowest_negatives() {
        let current = labels(&[0.0, 0.5, 0.5, 0.5]);
        let predictions = array![0.01, 0.05, 0.02, 0.1];

        // threshold 0.9 gives a negative threshold of 0.2.
        let shifts = deep_rate_limit(&predictions, &current, 0.9).unwrap();
        assert_eq!(shifts.negative, array![false, false, true, false]);
        assert_eq!(shifts.positive_count(), 0);
    }

    #[test]
    fn deep_limit_breaks_ties_by_index() {
        let current = labels(&[1.0, 0.5, 0.5, 0.5]);
        let predictions = array![1.0, 0.95, 0.95, 0.95];
        let shifts = deep_rate_limit(&predictions, &current, 0.9).unwrap();
        assert_eq!(shifts.positive, array![false, true, false, false]);
    }

    #[test]
    fn deep_limit_returns_all_candidates_under_budget() {
        let current = labels(&[1.0, 1.0, 1.0, 0.5, 0.5]);
        let predictions = array![0.2, 0.3, 0.4, 0.99, 0.5];
        let shifts = deep_rate_limit(&predictions, &current, 0.9).unwrap();
        assert_eq!(shifts.positive, array![false, false, false, true, false]);
    }

    #[test]
    fn deep_limit_rejects_length_mismatch() {
        let result = deep_rate_limit(&array![0.5], &labels(&[0.5, 0.5]), 0.9);
        assert!(matches!(result, Err(LabelError::InvalidInput { .. })));
    }

    #[test]
    fn context_sums_reject_dense_matrices() {
        let dense = EvidenceMatrix::Dense(array![[1, 0], [0, 1]]);
        let result = compute_context_sums(&dense, 1);
        assert!(matches!(result, Err(LabelError::TypeConstraint { .. })));
    }

    #[test]
    fn context_sums_return_pool_under_budget() {
        let matrix = CscMatrix::from_dense(&array![[1, 0, 0], [0, 0, 0], [0, 2, 1]]);
        let (mask, boundary) = compute_context_sums(&matrix.into(), 2).unwrap();
        assert_eq!(mask, array![true, false, true]);
        assert_eq!(boundary, 3);
    }

    #[test]
    fn context_sums_stop_at_crossing_column() {
        // Column 0 covers rows 0 and 1, column 1 adds rows 2 and 3.
        let matrix = CscMatrix::from_dense(&array![
            [1, 0, 0],
            [1, 1, 0],
            [0, 1, 0],
            [0, 3, 0],
            [0, 0, 1]
        ]);
        let (mask, boundary) = compute_context_sums(&matrix.into(), 3).unwrap();
        assert_eq!(boundary, 1);
        assert_eq!(count(&mask), 3);
        assert_eq!(mask, array![true, true, true, false, false]);
    }

    #[test]
    fn context_sums_respect_zero_budget() {
        let matrix = CscMatrix::from_dense(&array![[1], [1]]);
        let (mask, boundary) = compute_context_sums(&matrix.into(), 0).unwrap();
        assert_eq!(count(&mask), 0);
        assert_eq!(boundary, 0);
    }

    #[test]
    fn context_sums_hit_the_cap_exactly() {
        let dense = Array1::from_iter((0..20u32).map(|i| i % 3))
            .into_shape((5, 4))
            .unwrap();
        let matrix = CscMatrix::from_dense(&dense);
        let pool = matrix.row_sums().iter().filter(|&&s| s > 0).count();
        for cap in 0..pool {
            let (mask, _) = compute_context_sums(&matrix.clone().into(), cap).unwrap();
            assert_eq!(count(&mask), cap);
        }
    }

    #[test]
    fn inconsistent_matrix_is_a_fatal_invariant_violation() {
        // Stored entries are counted by row sums but no column owns them.
        let matrix = CscMatrix {
            rows: 3,
            cols: 1,
            indptr: vec![0, 0],
            indices: vec![0, 1, 2],
            data: vec![1, 1, 1],
        };
        let err = compute_context_sums(&matrix.into(), 1).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            LabelError::InvariantViolation {
                rows: 3,
                cols: 1,
                max_moves: 1,
                accumulated: 0
            }
        ));
    }

    #[test]
    fn term_limit_uses_solid_counts_as_budget() {
        let current = labels(&[1.0, 0.0, 0.5, 0.5, 0.5]);
        let positive = CscMatrix::from_dense(&array![[0], [0], [1], [1], [0]]);
        let negative = CscMatrix::from_dense(&array![[0, 0], [0, 0], [0, 0], [0, 0], [2, 0]]);

        let shift = term_rate_limit(&positive.into(), &negative.into(), &current).unwrap();
        assert_eq!(shift.shifts.positive, array![false, false, true, false, false]);
        assert_eq!(shift.positive_boundary, 0);
        assert_eq!(shift.shifts.negative, array![false, false, false, false, true]);
        assert_eq!(shift.negative_boundary, 2);
    }

    #[test]
    fn term_limit_rejects_misaligned_rows() {
        let current = labels(&[0.5, 0.5]);
        let evidence: EvidenceMatrix = CscMatrix::zeros(3, 1).into();
        let result = term_rate_limit(&evidence, &evidence, &current);
        assert!(matches!(result, Err(LabelError::InvalidInput { .. })));
    }
}
