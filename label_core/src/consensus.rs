//! Sign-agreement consensus across learner proposals.
//!
//! Each learner proposes a full label vector. A document moves only when
//! every proposal that wants it to move agrees on the direction; a single
//! dissenting learner vetoes the change for that round. Solid labels (exactly
//! 0 or 1) never move.

use ndarray::{Array1, Zip};

use crate::config::ConsensusConfig;
use crate::error::{LabelError, LabelResult};
use crate::labels::{LabelVector, ShiftMasks};

/// Merges learner proposals into one accepted shift per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusResolver {
    config: ConsensusConfig,
}

impl ConsensusResolver {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    pub fn confidence_increment(&self) -> f32 {
        self.config.confidence_increment
    }

    /// Apply the agreed shifts to `current` and return the new labels.
    ///
    /// A single proposal needs no agreement and is returned unchanged.
    pub fn get_consensus(
        &self,
        current: &LabelVector,
        proposals: &[LabelVector],
    ) -> LabelResult<LabelVector> {
        match proposals {
            [] => Err(LabelError::invalid_input(
                "consensus",
                "no label proposals provided",
            )),
            [single] => {
                tracing::warn!(
                    "Only one label proposal supplied; consensus has no effect this round"
                );
                Ok(single.clone())
            }
            _ => {
                let shifts = self.accepted_shifts(current, proposals)?;
                current.shifted(&shifts, self.config.confidence_increment)
            }
        }
    }

    /// Documents whose shift is accepted, without applying it.
    pub fn accepted_shifts(
        &self,
        current: &LabelVector,
        proposals: &[LabelVector],
    ) -> LabelResult<ShiftMasks> {
        if proposals.is_empty() {
            return Err(LabelError::invalid_input(
                "consensus",
                "no label proposals provided",
            ));
        }
        if let Some((index, proposal)) = proposals
            .iter()
            .enumerate()
            .find(|(_, proposal)| proposal.len() != current.len())
        {
            return Err(LabelError::invalid_input(
                "consensus",
                format!(
                    "proposal {index} covers {} documents, labels cover {}",
                    proposal.len(),
                    current.len()
                ),
            ));
        }

        let len = current.len();
        let mut wants_up = Array1::from_elem(len, false);
        let mut wants_down = Array1::from_elem(len, false);

        for proposal in proposals {
            Zip::from(&mut wants_up)
                .and(&mut wants_down)
                .and(proposal.values())
                .and(current.values())
                .for_each(|up, down, &proposed, &label| {
                    let delta = proposed - label;
                    *up |= delta > 0.0;
                    *down |= delta < 0.0;
                });
        }

        let non_solid = current.non_solid_mask();
        let mut positive = Array1::from_elem(len, false);
        let mut negative = Array1::from_elem(len, false);
        Zip::from(&mut positive)
            .and(&mut negative)
            .and(&wants_up)
            .and(&wants_down)
            .and(&non_solid)
            .for_each(|pos, neg, &up, &down, &movable| {
                let no_conflict = !(up && down);
                *pos = movable && no_conflict && up;
                *neg = movable && no_conflict && down;
            });

        ShiftMasks::new(positive, negative)
    }
}

impl Default for ConsensusResolver {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[f32]) -> LabelVector {
        LabelVector::new(values.to_vec()).unwrap()
    }

    fn resolver(increment: f32) -> ConsensusResolver {
        ConsensusResolver::new(ConsensusConfig {
            confidence_increment: increment,
        })
    }

    fn assert_close(actual: &LabelVector, expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.values().iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{a} != {e}");
        }
    }

    #[test]
    fn agreeing_learners_shift_documents() {
        let current = labels(&[0.5, 0.5, 0.9, 0.1]);
        let a = labels(&[0.7, 0.5, 0.9, 0.1]);
        let b = labels(&[0.6, 0.3, 0.9, 0.1]);

        let next = resolver(0.1).get_consensus(&current, &[a, b]).unwrap();
        assert_close(&next, &[0.6, 0.4, 0.9, 0.1]);
    }

    #[test]
    fn conflicting_learners_veto_the_shift() {
        let current = labels(&[0.5, 0.6]);
        let up = labels(&[0.6, 0.7]);
        let down = labels(&[0.4, 0.7]);

        let next = resolver(0.1).get_consensus(&current, &[up, down]).unwrap();
        assert_close(&next, &[0.5, 0.7]);
    }

    #[test]
    fn solid_labels_never_move() {
        let current = labels(&[0.0, 1.0, 0.5]);
        let a = labels(&[0.4, 0.2, 0.8]);
        let b = labels(&[0.3, 0.1, 0.9]);

        let next = resolver(0.2).get_consensus(&current, &[a, b]).unwrap();
        assert_close(&next, &[0.0, 1.0, 0.7]);
    }

    #[test]
    fn increments_saturate_at_the_boundary() {
        let current = labels(&[0.95, 0.02]);
        let a = labels(&[1.0, 0.0]);
        let b = labels(&[1.0, 0.0]);

        let next = resolver(0.1).get_consensus(&current, &[a, b]).unwrap();
        assert_close(&next, &[1.0, 0.0]);
    }

    #[test]
    fn single_proposal_passes_through() {
        let current = labels(&[0.5, 0.0]);
        let proposal = labels(&[0.9, 1.0]);

        let next = resolver(0.1)
            .get_consensus(&current, std::slice::from_ref(&proposal))
            .unwrap();
        assert_eq!(next, proposal);
    }

    #[test]
    fn empty_proposals_are_rejected() {
        let current = labels(&[0.5]);
        let result = resolver(0.1).get_consensus(&current, &[]);
        assert!(matches!(result, Err(LabelError::InvalidInput { .. })));
    }

    #[test]
    fn mismatched_proposal_length_is_rejected() {
        let current = labels(&[0.5, 0.5]);
        let result = resolver(0.1).get_consensus(&current, &[labels(&[0.6]), labels(&[0.6, 0.6])]);
        assert!(matches!(result, Err(LabelError::InvalidInput { .. })));
    }

    #[test]
    fn input_labels_are_not_mutated() {
        let current = labels(&[0.5, 0.5]);
        let snapshot = current.clone();
        let _ = resolver(0.1)
            .get_consensus(&current, &[labels(&[0.8, 0.2]), labels(&[0.7, 0.5])])
            .unwrap();
        assert_eq!(current, snapshot);
    }
}
