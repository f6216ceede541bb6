//! Historical match store
//!
//! Validated, in-memory table of past matches between teams of a closed set.
//! Construction filters raw rows; the store is read-only afterwards.

use std::collections::HashSet;
use std::path::Path;

use crate::data::dataset::{self, RawMatch};
use crate::{MatchRecord, Result, TossDecision};

/// Why a raw row was left out of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingField,
    UnknownTeam,
    UnknownWinner,
    SameTeams,
    BadTossDecision,
}

/// Filtering summary from a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub total_rows: usize,
    pub kept: usize,
    pub undecided: usize,
    pub missing_field: usize,
    pub unknown_team: usize,
    pub unknown_winner: usize,
    pub same_teams: usize,
    pub bad_toss_decision: usize,
}

impl LoadStats {
    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingField => self.missing_field += 1,
            DropReason::UnknownTeam => self.unknown_team += 1,
            DropReason::UnknownWinner => self.unknown_winner += 1,
            DropReason::SameTeams => self.same_teams += 1,
            DropReason::BadTossDecision => self.bad_toss_decision += 1,
        }
    }

    pub fn dropped(&self) -> usize {
        self.total_rows - self.kept
    }
}

/// In-memory store of validated matches, in original row order
#[derive(Debug, Clone)]
pub struct MatchStore {
    records: Vec<MatchRecord>,
    valid_teams: Vec<String>,
    stats: LoadStats,
}

impl MatchStore {
    /// Filter raw rows down to matches between valid teams
    pub fn load<I>(raw: I, valid_teams: &[String]) -> Self
    where
        I: IntoIterator<Item = RawMatch>,
    {
        let valid: HashSet<&str> = valid_teams.iter().map(String::as_str).collect();
        let mut stats = LoadStats::default();
        let mut records = Vec::new();

        for row in raw {
            stats.total_rows += 1;
            match validate(row, &valid) {
                Ok(record) => {
                    if !record.is_decided() {
                        stats.undecided += 1;
                    }
                    records.push(record);
                }
                Err(reason) => stats.record_drop(reason),
            }
        }
        stats.kept = records.len();

        log::debug!(
            "Kept {} of {} rows ({} undecided); dropped: {} missing field, {} unknown team, \
             {} unknown winner, {} same teams, {} bad toss decision",
            stats.kept,
            stats.total_rows,
            stats.undecided,
            stats.missing_field,
            stats.unknown_team,
            stats.unknown_winner,
            stats.same_teams,
            stats.bad_toss_decision
        );
        if stats.total_rows > 0 && stats.kept == 0 {
            log::warn!("No rows survived filtering; check teams.valid against the dataset");
        }

        MatchStore {
            records,
            valid_teams: valid_teams.to_vec(),
            stats,
        }
    }

    /// Read and filter a CSV dataset
    pub fn from_csv<P: AsRef<Path>>(path: P, valid_teams: &[String]) -> Result<Self> {
        let rows = dataset::read_csv(path)?;
        let store = Self::load(rows, valid_teams);
        log::info!(
            "Loaded {} matches ({} dropped)",
            store.len(),
            store.stats.dropped()
        );
        Ok(store)
    }

    /// Matches between two teams in either fixture order, optionally at one venue
    pub fn matches_between(
        &self,
        team_a: &str,
        team_b: &str,
        venue: Option<&str>,
    ) -> Vec<&MatchRecord> {
        self.records
            .iter()
            .filter(|r| r.is_between(team_a, team_b))
            .filter(|r| venue.map_or(true, |v| r.venue == v))
            .collect()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    /// Matches with a recorded winner
    pub fn decided(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter().filter(|r| r.is_decided())
    }

    pub fn valid_teams(&self) -> &[String] {
        &self.valid_teams
    }

    /// Distinct venues in first-seen order
    pub fn venues(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.venue.as_str())
            .filter(|v| seen.insert(*v))
            .collect()
    }

    pub fn load_stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate(row: RawMatch, valid: &HashSet<&str>) -> std::result::Result<MatchRecord, DropReason> {
    let (team1, team2, toss_winner, toss_decision, venue) = match (
        row.team1,
        row.team2,
        row.toss_winner,
        row.toss_decision,
        row.venue,
    ) {
        (Some(t1), Some(t2), Some(tw), Some(td), Some(v)) => (t1, t2, tw, td, v),
        _ => return Err(DropReason::MissingField),
    };

    if !valid.contains(team1.as_str())
        || !valid.contains(team2.as_str())
        || !valid.contains(toss_winner.as_str())
    {
        return Err(DropReason::UnknownTeam);
    }
    if let Some(winner) = &row.winner {
        if !valid.contains(winner.as_str()) {
            return Err(DropReason::UnknownWinner);
        }
    }
    if team1 == team2 {
        return Err(DropReason::SameTeams);
    }
    let toss_decision: TossDecision = toss_decision
        .parse()
        .map_err(|_| DropReason::BadTossDecision)?;

    Ok(MatchRecord {
        team1,
        team2,
        toss_winner,
        toss_decision,
        venue,
        winner: row.winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> Vec<String> {
        ["India", "Australia", "England"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    fn rows() -> Vec<RawMatch> {
        vec![
            RawMatch::new("India", "Australia", "India", "bat", "MCG", Some("India")),
            RawMatch::new("India", "Nepal", "India", "bat", "Kirtipur", Some("India")),
            RawMatch::new("Australia", "India", "India", "field", "MCG", None),
            RawMatch::new("England", "India", "England", "bat", "Lord's", Some("Ireland")),
            RawMatch {
                venue: None,
                ..RawMatch::new("England", "Australia", "England", "bat", "", Some("England"))
            },
            RawMatch::new("England", "England", "England", "bat", "Lord's", Some("England")),
            RawMatch::new("Australia", "England", "England", "bowl", "SCG", Some("England")),
            RawMatch::new("Australia", "India", "Australia", "Field", "SCG", Some("Australia")),
        ]
    }

    #[test]
    fn test_load_filters_and_keeps_order() {
        let store = MatchStore::load(rows(), &teams());
        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[0].venue, "MCG");
        assert_eq!(store.records()[1].winner, None);
        assert_eq!(store.records()[2].toss_decision, TossDecision::Field);

        let stats = store.load_stats();
        assert_eq!(stats.total_rows, 8);
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.undecided, 1);
        assert_eq!(stats.unknown_team, 1);
        assert_eq!(stats.unknown_winner, 1);
        assert_eq!(stats.missing_field, 1);
        assert_eq!(stats.same_teams, 1);
        assert_eq!(stats.bad_toss_decision, 1);
        assert_eq!(stats.dropped(), 5);
    }

    #[test]
    fn test_load_is_deterministic() {
        let a = MatchStore::load(rows(), &teams());
        let b = MatchStore::load(rows(), &teams());
        assert_eq!(a.records(), b.records());
    }

    #[test]
    fn test_matches_between_either_order() {
        let store = MatchStore::load(rows(), &teams());
        let all = store.matches_between("Australia", "India", None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].team1, "India");

        let at_mcg = store.matches_between("India", "Australia", Some("MCG"));
        assert_eq!(at_mcg.len(), 2);
        assert!(store.matches_between("India", "England", None).is_empty());
    }

    #[test]
    fn test_venues_first_seen() {
        let store = MatchStore::load(rows(), &teams());
        assert_eq!(store.venues(), vec!["MCG", "SCG"]);
    }
}
