//! Sparse per-feature evidence aligned with the document index space.
//!
//! Rows are documents, columns are features (terms, n-grams, lexicon hits)
//! in priority order, and each cell counts how often a document matched a
//! feature associated with a shift.

pub mod csc;

use ndarray::Array2;

pub use csc::CscMatrix;

use crate::error::{LabelError, LabelResult};

/// Evidence in one of the supported storage layouts.
///
/// The rate limiter only walks [`EvidenceMatrix::Csc`]; other layouts must be
/// converted with [`EvidenceMatrix::to_csc`] first.
#[derive(Debug, Clone, PartialEq)]
pub enum EvidenceMatrix {
    Csc(CscMatrix),
    Dense(Array2<u32>),
}

impl EvidenceMatrix {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            EvidenceMatrix::Csc(matrix) => matrix.shape(),
            EvidenceMatrix::Dense(matrix) => matrix.dim(),
        }
    }

    pub fn layout_name(&self) -> &'static str {
        match self {
            EvidenceMatrix::Csc(_) => "compressed-sparse-column",
            EvidenceMatrix::Dense(_) => "dense",
        }
    }

    /// Borrow the CSC representation, failing for any other layout.
    pub fn as_csc(&self) -> LabelResult<&CscMatrix> {
        match self {
            EvidenceMatrix::Csc(matrix) => Ok(matrix),
            other => Err(LabelError::TypeConstraint {
                expected: "compressed-sparse-column",
                found: other.layout_name(),
            }),
        }
    }

    pub fn to_csc(&self) -> CscMatrix {
        match self {
            EvidenceMatrix::Csc(matrix) => matrix.clone(),
            EvidenceMatrix::Dense(matrix) => CscMatrix::from_dense(matrix),
        }
    }
}

impl From<CscMatrix> for EvidenceMatrix {
    fn from(matrix: CscMatrix) -> Self {
        EvidenceMatrix::Csc(matrix)
    }
}

/// Positive and negative evidence emitted by one sparse learner per round.
#[derive(Debug, Clone, PartialEq)]
pub struct TermEvidence {
    pub positive: EvidenceMatrix,
    pub negative: EvidenceMatrix,
}

impl TermEvidence {
    pub fn new(positive: impl Into<EvidenceMatrix>, negative: impl Into<EvidenceMatrix>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// No evidence in either direction for `rows` documents.
    pub fn empty(rows: usize) -> Self {
        Self::new(CscMatrix::zeros(rows, 0), CscMatrix::zeros(rows, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn dense_evidence_is_not_csc() {
        let evidence = EvidenceMatrix::Dense(array![[1, 0], [0, 2]]);
        assert!(matches!(
            evidence.as_csc(),
            Err(LabelError::TypeConstraint { found: "dense", .. })
        ));
    }

    #[test]
    fn dense_converts_to_equivalent_csc() {
        let dense = array![[1, 0, 3], [0, 2, 0]];
        let csc = EvidenceMatrix::Dense(dense.clone()).to_csc();
        assert_eq!(csc.shape(), (2, 3));
        assert_eq!(csc.to_dense(), dense);
    }
}
