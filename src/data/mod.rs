//! Data ingestion
//!
//! CSV reading of the historical dataset and the filtered match store.

pub mod dataset;
pub mod store;

pub use dataset::RawMatch;
pub use store::{LoadStats, MatchStore};
