//! Historical statistics
//!
//! Head-to-head records, venue win rates and the precomputed tables.

pub mod head_to_head;
pub mod tables;
pub mod venue;

pub use head_to_head::{tally, Aggregator, HeadToHead};
pub use venue::{VenueSummary, VenueWinRate};
