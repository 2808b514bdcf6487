//! Diagnostics over labels and predictions.
//!
//! - [`LabelSummary`] - how much of the corpus is solid, neutral or in between
//! - [`compare_predictions`] - agreement with human-validated annotations
//! - [`prediction_percentiles`] - upper-tail spread of a prediction vector

pub mod comparison;
pub mod distribution;

pub use comparison::{compare_predictions, AnnotatorVotes, PredictionComparison};
pub use distribution::{prediction_percentiles, LabelSummary, Percentile, REPORTED_PERCENTILES};
