//! Outcome classifier
//!
//! A random forest of CART trees over encoded match attributes.

pub mod forest;
pub mod tree;

pub use forest::{ForestConfig, RandomForest};
pub use tree::DecisionTree;
