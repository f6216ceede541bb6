//! Venue win rates
//!
//! Percentages are taken over decided matches only and rounded to one decimal.

use serde::Serialize;

use crate::data::MatchStore;
use crate::stats::head_to_head::HeadToHead;

/// Round a percentage to one decimal place
pub fn round_pct(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Pairwise win rate at a venue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VenueWinRate {
    Available {
        team_a_pct: f64,
        team_b_pct: f64,
        undecided_count: u32,
    },
    /// Neither team has won a match there against the other
    Unavailable { undecided_count: u32 },
}

impl VenueWinRate {
    pub fn from_record(record: &HeadToHead) -> Self {
        let decided = record.decided();
        if decided == 0 {
            return VenueWinRate::Unavailable {
                undecided_count: record.undecided,
            };
        }
        let decided = decided as f64;
        VenueWinRate::Available {
            team_a_pct: round_pct(100.0 * record.team_a_wins as f64 / decided),
            team_b_pct: round_pct(100.0 * record.team_b_wins as f64 / decided),
            undecided_count: record.undecided,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, VenueWinRate::Available { .. })
    }

    pub fn undecided_count(&self) -> u32 {
        match self {
            VenueWinRate::Available {
                undecided_count, ..
            }
            | VenueWinRate::Unavailable { undecided_count } => *undecided_count,
        }
    }
}

/// Results of every valid team at one venue, against any opponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueSummary {
    pub venue: String,
    /// Wins per valid team, in valid-team order
    pub wins: Vec<(String, u32)>,
    /// Decided matches at the venue
    pub decided: u32,
    pub undecided: u32,
}

impl VenueSummary {
    pub fn compute(store: &MatchStore, venue: &str) -> Self {
        let mut wins: Vec<(String, u32)> = store
            .valid_teams()
            .iter()
            .map(|t| (t.clone(), 0))
            .collect();
        let mut decided = 0;
        let mut undecided = 0;

        for m in store.records().iter().filter(|m| m.venue == venue) {
            match &m.winner {
                Some(winner) => {
                    decided += 1;
                    if let Some(entry) = wins.iter_mut().find(|(team, _)| team == winner) {
                        entry.1 += 1;
                    }
                }
                None => undecided += 1,
            }
        }

        VenueSummary {
            venue: venue.to_string(),
            wins,
            decided,
            undecided,
        }
    }

    pub fn wins_for(&self, team: &str) -> u32 {
        self.wins
            .iter()
            .find(|(t, _)| t == team)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }

    /// Share of decided matches at the venue won by the team; None if no decided matches
    pub fn win_pct(&self, team: &str) -> Option<f64> {
        if self.decided == 0 {
            return None;
        }
        Some(round_pct(
            100.0 * self.wins_for(team) as f64 / self.decided as f64,
        ))
    }
}
