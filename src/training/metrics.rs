//! Classification metrics for training and evaluation

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prediction accuracy accumulated over samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Number of correct winner predictions
    pub correct: usize,
    /// Total predictions
    pub total: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction against its label
    pub fn update(&mut self, predicted: u32, actual: u32) {
        self.total += 1;
        if predicted == actual {
            self.correct += 1;
        }
    }

    /// Get win prediction accuracy; None when nothing was evaluated
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }

    /// Merge another metrics instance
    pub fn merge(&mut self, other: &Metrics) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.accuracy() {
            Some(acc) => write!(f, "Acc: {:.2}% ({}/{})", acc * 100.0, self.correct, self.total),
            None => write!(f, "Acc: n/a (0 samples)"),
        }
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train: Metrics,
    pub test: Metrics,
    /// Number of winner classes
    pub n_classes: usize,
    /// Decided matches used for training + evaluation
    pub decided_matches: usize,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Train {} | Test {} | {} classes over {} decided matches",
            self.train, self.test, self.n_classes, self.decided_matches
        )
    }
}
