//! Model training
//!
//! Offline fitting of encoders and classifier, plus accuracy tracking.

pub mod metrics;
pub mod trainer;

pub use metrics::{Metrics, TrainingReport};
pub use trainer::Trainer;
