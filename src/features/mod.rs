//! Feature encoding
//!
//! Converts raw match attributes into model-ready codes.

pub mod encoding;
pub mod match_repr;

pub use encoding::{Encoder, EncoderRegistry, Field};
pub use match_repr::AttributeVector;
