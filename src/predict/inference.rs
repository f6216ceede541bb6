//! Match prediction
//!
//! Validates a query, encodes it, runs the classifier and attaches the
//! head-to-head statistics for the two teams.

use serde::{Deserialize, Serialize};

use crate::data::MatchStore;
use crate::features::{AttributeVector, Field};
use crate::predict::bundle::ServingBundle;
use crate::stats::{Aggregator, HeadToHead, VenueWinRate};
use crate::{Config, CricketError, Result, TossDecision};

/// Match parameters chosen by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub toss_winner: String,
    pub toss_decision: String,
}

impl MatchQuery {
    pub fn new(
        team1: &str,
        team2: &str,
        venue: &str,
        toss_winner: &str,
        toss_decision: &str,
    ) -> Self {
        MatchQuery {
            team1: team1.to_string(),
            team2: team2.to_string(),
            venue: venue.to_string(),
            toss_winner: toss_winner.to_string(),
            toss_decision: toss_decision.to_string(),
        }
    }

    /// Pairing rules that hold regardless of the trained domain
    pub fn validate(&self) -> Result<()> {
        if self.team1 == self.team2 {
            return Err(CricketError::InvalidQuery(format!(
                "team1 and team2 are both {}",
                self.team1
            )));
        }
        if self.toss_winner != self.team1 && self.toss_winner != self.team2 {
            return Err(CricketError::InvalidQuery(format!(
                "toss winner {} is neither {} nor {}",
                self.toss_winner, self.team1, self.team2
            )));
        }
        Ok(())
    }

    /// Canonical spelling of the toss decision ("Bat" -> "bat"); unknown values pass through
    fn toss_decision_key(&self) -> &str {
        match self.toss_decision.parse::<TossDecision>() {
            Ok(decision) => decision.as_str(),
            Err(_) => &self.toss_decision,
        }
    }
}

/// Prediction plus supporting statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub team1: String,
    pub team2: String,
    pub venue: String,
    pub predicted_winner: String,
    /// team_a = team1, team_b = team2
    pub head_to_head: HeadToHead,
    pub head_to_head_at_venue: HeadToHead,
    pub venue_win_rate: VenueWinRate,
}

/// Predictor over an immutable bundle and match store
pub struct Predictor {
    bundle: ServingBundle,
    store: MatchStore,
}

impl Predictor {
    pub fn new(bundle: ServingBundle, store: MatchStore) -> Self {
        Predictor { bundle, store }
    }

    /// Load the bundle and historical matches named in the config
    pub fn load(config: &Config) -> Result<Self> {
        let bundle = ServingBundle::load(&config.data.artifact_path)?;
        let store = MatchStore::from_csv(&config.data.dataset_path, &config.teams.valid)?;
        Ok(Self::new(bundle, store))
    }

    /// Predict the winner and assemble the full report
    pub fn predict_match(&self, query: &MatchQuery) -> Result<MatchReport> {
        let predicted_winner = self.predict_winner(query)?;
        let stats = self.aggregator();

        Ok(MatchReport {
            team1: query.team1.clone(),
            team2: query.team2.clone(),
            venue: query.venue.clone(),
            predicted_winner,
            head_to_head: stats.head_to_head(&query.team1, &query.team2),
            head_to_head_at_venue: stats.head_to_head_at_venue(
                &query.team1,
                &query.team2,
                &query.venue,
            ),
            venue_win_rate: stats.venue_win_rate(&query.team1, &query.team2, &query.venue),
        })
    }

    /// Classifier output only
    pub fn predict_winner(&self, query: &MatchQuery) -> Result<String> {
        query.validate()?;

        let encoders = self.bundle.encoders();
        let vector = AttributeVector::encode(
            encoders,
            [
                query.team1.as_str(),
                query.team2.as_str(),
                query.toss_winner.as_str(),
                query.toss_decision_key(),
                query.venue.as_str(),
            ],
        )?;
        let code = self.bundle.model().predict(vector.as_slice())?;
        let winner = encoders.decode(Field::Winner, code)?;
        log::debug!("Encoded {:?} -> winner code {} ({})", vector, code, winner);
        Ok(winner.to_string())
    }

    fn aggregator(&self) -> Aggregator<'_> {
        Aggregator::new(&self.store)
    }

    /// Values a query may use for one input field
    pub fn options(&self, field: Field) -> &[String] {
        self.bundle.encoders().options(field)
    }
}

/// Format a head-to-head record for display
pub fn format_head_to_head(team_a: &str, team_b: &str, record: &HeadToHead) -> String {
    let mut out = format!(
        "  {}: {} wins\n  {}: {} wins\n  Total matches: {}\n",
        team_a, record.team_a_wins, team_b, record.team_b_wins, record.total_matches
    );
    if record.undecided > 0 {
        out.push_str(&format!("  Draws/No Result: {}\n", record.undecided));
    }
    out
}

/// Format a venue win rate for display
pub fn format_venue_win_rate(team_a: &str, team_b: &str, venue: &str, rate: &VenueWinRate) -> String {
    match rate {
        VenueWinRate::Available {
            team_a_pct,
            team_b_pct,
            undecided_count,
        } => {
            let mut out = format!(
                "  {} at {} vs {}: {:.1}%\n  {} at {} vs {}: {:.1}%\n",
                team_a, venue, team_b, team_a_pct, team_b, venue, team_a, team_b_pct
            );
            if *undecided_count > 0 {
                out.push_str(&format!("  Draws/No Result at venue: {}\n", undecided_count));
            }
            out
        }
        VenueWinRate::Unavailable { .. } => {
            "  No win percentage data for these teams at this venue.\n".to_string()
        }
    }
}

/// Format a full report for display
pub fn format_report(report: &MatchReport) -> String {
    let (a, b, venue) = (&report.team1, &report.team2, &report.venue);
    let mut out = String::new();
    out.push_str("┌─────────────────────────────────────────────────┐\n");
    out.push_str(&format!("│  {} vs {} at {}\n", a, b, venue));
    out.push_str("├─────────────────────────────────────────────────┤\n");
    out.push_str(&format!("│  Predicted winner: {}\n", report.predicted_winner));
    out.push_str("└─────────────────────────────────────────────────┘\n");

    out.push_str("\nOverall Head-to-Head\n");
    out.push_str(&format_head_to_head(a, b, &report.head_to_head));

    if report.head_to_head_at_venue.is_empty() {
        out.push_str("\n  No head-to-head data available for this venue.\n");
    } else {
        out.push_str(&format!("\nHead-to-Head at {}\n", venue));
        out.push_str(&format_head_to_head(a, b, &report.head_to_head_at_venue));
    }

    out.push_str("\nVenue Win Rate vs Opponent\n");
    out.push_str(&format_venue_win_rate(a, b, venue, &report.venue_win_rate));
    out
}
