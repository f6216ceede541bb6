//! Match attribute vector: the classifier's input representation

use crate::features::encoding::{EncoderRegistry, Field};
use crate::{MatchRecord, Result};

/// Number of input fields
pub const ATTRIBUTE_DIM: usize = 5;

/// Encoded (team1, team2, toss_winner, toss_decision, venue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeVector(pub [u32; ATTRIBUTE_DIM]);

impl AttributeVector {
    /// Encode raw attribute values, in `Field::INPUTS` order
    pub fn encode(registry: &EncoderRegistry, values: [&str; ATTRIBUTE_DIM]) -> Result<Self> {
        let mut codes = [0u32; ATTRIBUTE_DIM];
        for (i, (field, value)) in Field::INPUTS.iter().zip(values).enumerate() {
            codes[i] = registry.encode(*field, value)?;
        }
        Ok(AttributeVector(codes))
    }

    /// Encode the attributes of a historical match
    pub fn from_match(registry: &EncoderRegistry, record: &MatchRecord) -> Result<Self> {
        Self::encode(
            registry,
            [
                record.team1.as_str(),
                record.team2.as_str(),
                record.toss_winner.as_str(),
                record.toss_decision.as_str(),
                record.venue.as_str(),
            ],
        )
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn code(&self, field: Field) -> Option<u32> {
        Field::INPUTS
            .iter()
            .position(|f| *f == field)
            .map(|i| self.0[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CricketError, TossDecision};

    fn registry() -> EncoderRegistry {
        let records = vec![
            MatchRecord {
                team1: "India".to_string(),
                team2: "Australia".to_string(),
                toss_winner: "Australia".to_string(),
                toss_decision: TossDecision::Bat,
                venue: "MCG".to_string(),
                winner: Some("India".to_string()),
            },
            MatchRecord {
                team1: "Australia".to_string(),
                team2: "India".to_string(),
                toss_winner: "India".to_string(),
                toss_decision: TossDecision::Field,
                venue: "Wankhede".to_string(),
                winner: Some("Australia".to_string()),
            },
        ];
        EncoderRegistry::fit(&records).unwrap()
    }

    #[test]
    fn test_field_order() {
        let registry = registry();
        let vector =
            AttributeVector::encode(&registry, ["Australia", "Australia", "India", "field", "MCG"])
                .unwrap();
        assert_eq!(vector.0, [1, 0, 1, 1, 0]);
        assert_eq!(vector.code(Field::TossDecision), Some(1));
        assert_eq!(vector.code(Field::Winner), None);
    }

    #[test]
    fn test_unknown_venue_fails() {
        let registry = registry();
        let err = AttributeVector::encode(&registry, ["India", "Australia", "India", "bat", "Lord's"])
            .unwrap_err();
        assert!(matches!(err, CricketError::UnknownCategory { field: Field::Venue, .. }));
    }
}
