//! Prediction and inference
//!
//! Load the trained bundle and answer match queries.

pub mod bundle;
pub mod inference;

pub use bundle::{BundleMetadata, ServingBundle};
pub use inference::{MatchQuery, MatchReport, Predictor};
