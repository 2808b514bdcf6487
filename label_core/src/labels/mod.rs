//! Per-document confidence labels and the shifts applied to them.
//!
//! A label is a confidence in `[0, 1]` that a document exhibits the target
//! trait. `0.5` is the unknown sentinel, while `0` and `1` are *solid* labels
//! that consensus never moves.

pub mod shift;
pub mod vector;

pub use shift::ShiftMasks;
pub use vector::{LabelVector, MIDPOINT};
