//! Cricket match prediction
//!
//! Predicts the winner of a match from its categorical attributes (teams, toss,
//! venue) with a random forest, and reports head-to-head and venue statistics
//! computed from the historical match table.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod stats;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use features::encoding::Field;

/// Decision taken by the toss winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        }
    }
}

impl fmt::Display for TossDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TossDecision {
    type Err = CricketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bat" => Ok(TossDecision::Bat),
            "field" => Ok(TossDecision::Field),
            _ => Err(CricketError::Parse(format!(
                "Unknown toss decision: {}. Use bat or field.",
                s
            ))),
        }
    }
}

/// A validated historical match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub team1: String,
    pub team2: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    pub venue: String,
    /// None for a draw, tie, no result or abandoned match
    pub winner: Option<String>,
}

impl MatchRecord {
    /// Check if the match was played between the two teams, in either order
    pub fn is_between(&self, team_a: &str, team_b: &str) -> bool {
        (self.team1 == team_a && self.team2 == team_b)
            || (self.team1 == team_b && self.team2 == team_a)
    }

    /// Check if the given team won this match
    pub fn won_by(&self, team: &str) -> bool {
        self.winner.as_deref() == Some(team)
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Value of a categorical field as it is fed to the encoders
    pub fn field_value(&self, field: Field) -> Option<&str> {
        match field {
            Field::Team1 => Some(&self.team1),
            Field::Team2 => Some(&self.team2),
            Field::TossWinner => Some(&self.toss_winner),
            Field::TossDecision => Some(self.toss_decision.as_str()),
            Field::Venue => Some(&self.venue),
            Field::Winner => self.winner.as_deref(),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum CricketError {
    #[error("No values to fit the {field} encoder")]
    EmptyDomain { field: Field },

    #[error("Unknown {field} category: {value}")]
    UnknownCategory { field: Field, value: String },

    #[error("Invalid {field} code {code}: encoder has {size} categories")]
    InvalidCode { field: Field, code: u32, size: usize },

    #[error("Insufficient training data: found {classes} winner class(es), need at least 2")]
    InsufficientData { classes: usize },

    #[error("Attribute vector does not match the trained model: {0}")]
    ShapeMismatch(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Serving bundle has no encoder for {0}")]
    MissingEncoder(Field),

    #[error("Model not trained - run `cricket train` first")]
    NoModel,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CricketError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub teams: TeamsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub dataset_path: String,
    pub artifact_path: String,
    pub stats_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split; floor(sqrt(n_features)) when unset
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
    pub test_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsConfig {
    pub valid: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                dataset_path: "data/ODI_Match_info.csv".to_string(),
                artifact_path: "model/cricket_model.json".to_string(),
                stats_dir: "model/stats".to_string(),
            },
            training: TrainingConfig {
                n_estimators: 100,
                max_depth: None,
                min_samples_split: 2,
                max_features: None,
                bootstrap: true,
                seed: 42,
                test_fraction: 0.2,
            },
            teams: TeamsConfig {
                valid: [
                    "India",
                    "Australia",
                    "England",
                    "Pakistan",
                    "South Africa",
                    "New Zealand",
                    "Sri Lanka",
                    "Bangladesh",
                    "Afghanistan",
                    "West Indies",
                ]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CricketError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CricketError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CricketError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.teams.valid.len() < 2 {
            return Err(CricketError::Config(
                "teams.valid must list at least two teams".to_string(),
            ));
        }
        if self.training.n_estimators == 0 {
            return Err(CricketError::Config(
                "training.n_estimators must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.training.test_fraction) {
            return Err(CricketError::Config(format!(
                "training.test_fraction must be in [0, 1), got {}",
                self.training.test_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toss_decision_parse() {
        assert_eq!("bat".parse::<TossDecision>().unwrap(), TossDecision::Bat);
        assert_eq!(" Field ".parse::<TossDecision>().unwrap(), TossDecision::Field);
        assert!("bowl".parse::<TossDecision>().is_err());
    }

    #[test]
    fn test_is_between_either_order() {
        let record = MatchRecord {
            team1: "India".to_string(),
            team2: "Australia".to_string(),
            toss_winner: "India".to_string(),
            toss_decision: TossDecision::Bat,
            venue: "MCG".to_string(),
            winner: None,
        };
        assert!(record.is_between("India", "Australia"));
        assert!(record.is_between("Australia", "India"));
        assert!(!record.is_between("India", "England"));
        assert_eq!(record.field_value(Field::Winner), None);
        assert_eq!(record.field_value(Field::TossDecision), Some("bat"));
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.teams.valid.len(), 10);
        assert_eq!(parsed.training.n_estimators, 100);
        assert_eq!(parsed.training.seed, 42);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_fraction() {
        let mut config = Config::default();
        config.training.test_fraction = 1.0;
        assert!(config.validate().is_err());
    }
}
