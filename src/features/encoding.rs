//! Categorical encoders for match attributes
//!
//! Each categorical field gets its own dense code space, assigned in order of
//! first occurrence at training time.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CricketError, MatchRecord, Result};

/// Categorical field identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Team1,
    Team2,
    TossWinner,
    TossDecision,
    Venue,
    Winner,
}

impl Field {
    /// Input fields, in attribute vector order
    pub const INPUTS: [Field; 5] = [
        Field::Team1,
        Field::Team2,
        Field::TossWinner,
        Field::TossDecision,
        Field::Venue,
    ];

    pub const ALL: [Field; 6] = [
        Field::Team1,
        Field::Team2,
        Field::TossWinner,
        Field::TossDecision,
        Field::Venue,
        Field::Winner,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Team1 => "team1",
            Field::Team2 => "team2",
            Field::TossWinner => "toss_winner",
            Field::TossDecision => "toss_decision",
            Field::Venue => "venue",
            Field::Winner => "winner",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bidirectional value <-> code mapping for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncoderRepr", into = "EncoderRepr")]
pub struct Encoder {
    field: Field,
    /// Code is the index
    values: Vec<String>,
    codes: HashMap<String, u32>,
}

#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    field: Field,
    values: Vec<String>,
}

impl TryFrom<EncoderRepr> for Encoder {
    type Error = CricketError;

    fn try_from(repr: EncoderRepr) -> Result<Self> {
        let encoder = Encoder::fit(repr.field, repr.values.iter().map(String::as_str))?;
        if encoder.len() != repr.values.len() {
            return Err(CricketError::Parse(format!(
                "{} encoder has duplicate categories",
                repr.field
            )));
        }
        Ok(encoder)
    }
}

impl From<Encoder> for EncoderRepr {
    fn from(encoder: Encoder) -> Self {
        EncoderRepr {
            field: encoder.field,
            values: encoder.values,
        }
    }
}

impl Encoder {
    /// Assign codes to distinct values in order of first occurrence
    pub fn fit<'a, I>(field: Field, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut encoder = Encoder {
            field,
            values: Vec::new(),
            codes: HashMap::new(),
        };

        for value in values {
            if !encoder.codes.contains_key(value) {
                encoder.codes.insert(value.to_string(), encoder.values.len() as u32);
                encoder.values.push(value.to_string());
            }
        }

        if encoder.values.is_empty() {
            return Err(CricketError::EmptyDomain { field });
        }

        Ok(encoder)
    }

    pub fn encode(&self, value: &str) -> Result<u32> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| CricketError::UnknownCategory {
                field: self.field,
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: u32) -> Result<&str> {
        self.values
            .get(code as usize)
            .map(String::as_str)
            .ok_or(CricketError::InvalidCode {
                field: self.field,
                code,
                size: self.values.len(),
            })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Number of categories (K); valid codes are 0..K
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Known categories in code order
    pub fn classes(&self) -> &[String] {
        &self.values
    }
}

/// One encoder per categorical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderRegistry {
    encoders: BTreeMap<Field, Encoder>,
}

impl EncoderRegistry {
    /// Fit all six field encoders over the given records
    ///
    /// Records without a winner contribute nothing to the winner encoder.
    pub fn fit(records: &[MatchRecord]) -> Result<Self> {
        let mut encoders = BTreeMap::new();
        for field in Field::ALL {
            let encoder = Encoder::fit(field, records.iter().filter_map(|r| r.field_value(field)))?;
            log::debug!("Fitted {} encoder with {} categories", field, encoder.len());
            encoders.insert(field, encoder);
        }
        Ok(EncoderRegistry { encoders })
    }

    /// Build from prefitted encoders; every field must be present exactly once
    pub fn from_encoders(list: Vec<Encoder>) -> Result<Self> {
        let mut encoders = BTreeMap::new();
        for encoder in list {
            let field = encoder.field();
            if encoders.insert(field, encoder).is_some() {
                return Err(CricketError::Parse(format!("Duplicate encoder for {}", field)));
            }
        }
        let registry = EncoderRegistry { encoders };
        registry.validate()?;
        Ok(registry)
    }

    /// Check that every field has an encoder filed under its own key
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let encoder = self.get(field)?;
            if encoder.field() != field {
                return Err(CricketError::Parse(format!(
                    "Encoder for {} is filed under {}",
                    encoder.field(),
                    field
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, field: Field) -> Result<&Encoder> {
        self.encoders
            .get(&field)
            .ok_or(CricketError::MissingEncoder(field))
    }

    pub fn encode(&self, field: Field, value: &str) -> Result<u32> {
        self.get(field)?.encode(value)
    }

    pub fn decode(&self, field: Field, code: u32) -> Result<&str> {
        self.get(field)?.decode(code)
    }

    /// Domain sizes of the input fields, in attribute vector order
    pub fn input_domains(&self) -> Result<Vec<usize>> {
        Field::INPUTS
            .iter()
            .map(|&field| self.get(field).map(Encoder::len))
            .collect()
    }

    /// Values a query may use for `field`, in code order
    ///
    /// Each field has its own domain: a team seen only as team2 is not a
    /// valid team1.
    pub fn options(&self, field: Field) -> &[String] {
        self.get(field).map(Encoder::classes).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TossDecision;

    fn record(team1: &str, team2: &str, venue: &str, winner: Option<&str>) -> MatchRecord {
        MatchRecord {
            team1: team1.to_string(),
            team2: team2.to_string(),
            toss_winner: team1.to_string(),
            toss_decision: TossDecision::Field,
            venue: venue.to_string(),
            winner: winner.map(str::to_string),
        }
    }

    #[test]
    fn test_first_seen_order() {
        let encoder = Encoder::fit(Field::Venue, ["MCG", "Lord's", "MCG", "Eden Gardens"]).unwrap();
        assert_eq!(encoder.len(), 3);
        assert_eq!(encoder.encode("MCG").unwrap(), 0);
        assert_eq!(encoder.encode("Lord's").unwrap(), 1);
        assert_eq!(encoder.encode("Eden Gardens").unwrap(), 2);
    }

    #[test]
    fn test_round_trip() {
        let values = ["India", "Australia", "England", "India"];
        let encoder = Encoder::fit(Field::Team1, values).unwrap();
        for value in values {
            let code = encoder.encode(value).unwrap();
            assert_eq!(encoder.decode(code).unwrap(), value);
        }
    }

    #[test]
    fn test_empty_domain() {
        let err = Encoder::fit(Field::Venue, std::iter::empty()).unwrap_err();
        assert!(matches!(err, CricketError::EmptyDomain { field: Field::Venue }));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let encoder = Encoder::fit(Field::Team1, ["India", "Australia"]).unwrap();
        match encoder.encode("Nepal") {
            Err(CricketError::UnknownCategory { field, value }) => {
                assert_eq!(field, Field::Team1);
                assert_eq!(value, "Nepal");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_code() {
        let encoder = Encoder::fit(Field::Winner, ["India", "Australia"]).unwrap();
        assert!(matches!(
            encoder.decode(2),
            Err(CricketError::InvalidCode { code: 2, size: 2, .. })
        ));
    }

    #[test]
    fn test_registry_fields_do_not_share_codes() {
        let records = vec![
            record("India", "Australia", "MCG", Some("India")),
            record("Australia", "England", "Lord's", Some("England")),
        ];
        let registry = EncoderRegistry::fit(&records).unwrap();

        assert_eq!(registry.encode(Field::Team1, "Australia").unwrap(), 1);
        assert_eq!(registry.encode(Field::Team2, "Australia").unwrap(), 0);
        assert_eq!(registry.encode(Field::Winner, "England").unwrap(), 1);
        assert!(registry.encode(Field::Team2, "India").is_err());
        assert_eq!(registry.input_domains().unwrap(), vec![2, 2, 2, 1, 2]);
        assert_eq!(registry.options(Field::Team1), &["India", "Australia"]);
        assert_eq!(registry.options(Field::Team2), &["Australia", "England"]);
    }

    #[test]
    fn test_registry_needs_a_winner() {
        let records = vec![record("India", "Australia", "MCG", None)];
        assert!(matches!(
            EncoderRegistry::fit(&records),
            Err(CricketError::EmptyDomain { field: Field::Winner })
        ));
    }

    #[test]
    fn test_serde_round_trip_keeps_codes() {
        let records = vec![
            record("India", "Australia", "MCG", Some("India")),
            record("England", "India", "Lord's", Some("India")),
        ];
        let registry = EncoderRegistry::fit(&records).unwrap();
        let json = serde_json::to_string(&registry).unwrap();
        let restored: EncoderRegistry = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, registry);
        assert_eq!(restored.encode(Field::Team1, "England").unwrap(), 1);
        assert!(json.contains("\"toss_winner\""));
    }

    #[test]
    fn test_duplicate_categories_rejected_on_load() {
        let json = r#"{"field":"venue","values":["MCG","MCG"]}"#;
        assert!(serde_json::from_str::<Encoder>(json).is_err());
    }

    #[test]
    fn test_missing_encoder() {
        let only_team1 = Encoder::fit(Field::Team1, ["India"]).unwrap();
        assert!(matches!(
            EncoderRegistry::from_encoders(vec![only_team1]),
            Err(CricketError::MissingEncoder(Field::Team2))
        ));
    }
}
