//! Raw historical match rows read from CSV
//!
//! The file must have a header row; columns other than the six match
//! attributes are ignored. Empty cells are read as missing values.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::Result;

/// One unvalidated row of the historical dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawMatch {
    #[serde(default)]
    pub team1: Option<String>,
    #[serde(default)]
    pub team2: Option<String>,
    #[serde(default)]
    pub toss_winner: Option<String>,
    #[serde(default)]
    pub toss_decision: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub winner: Option<String>,
}

impl RawMatch {
    /// Convenience constructor, mostly for tests and fixtures
    pub fn new(
        team1: &str,
        team2: &str,
        toss_winner: &str,
        toss_decision: &str,
        venue: &str,
        winner: Option<&str>,
    ) -> Self {
        RawMatch {
            team1: Some(team1.to_string()),
            team2: Some(team2.to_string()),
            toss_winner: Some(toss_winner.to_string()),
            toss_decision: Some(toss_decision.to_string()),
            venue: Some(venue.to_string()),
            winner: winner.map(str::to_string),
        }
    }
}

/// Read all rows from a CSV file
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawMatch>> {
    let path = path.as_ref();
    log::info!("Reading historical matches from {}", path.display());
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    collect_rows(reader)
}

/// Read all rows from any CSV source
pub fn read_csv_from<R: Read>(source: R) -> Result<Vec<RawMatch>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);
    collect_rows(reader)
}

fn collect_rows<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawMatch>> {
    let mut rows = Vec::new();
    for row in reader.deserialize::<RawMatch>() {
        rows.push(row?.normalized());
    }
    log::debug!("Read {} raw rows", rows.len());
    Ok(rows)
}

impl RawMatch {
    /// Treat blank cells as missing
    fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        RawMatch {
            team1: clean(self.team1),
            team2: clean(self.team2),
            toss_winner: clean(self.toss_winner),
            toss_decision: clean(self.toss_decision),
            venue: clean(self.venue),
            winner: clean(self.winner),
        }
    }
}
