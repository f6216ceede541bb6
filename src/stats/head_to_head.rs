//! Head-to-head records between two teams
//!
//! Records are keyed by team identity, not by which side of the fixture a
//! team was listed on, so a pair's tally is the same whichever way round
//! the matches were recorded.

use serde::Serialize;

use crate::data::MatchStore;
use crate::stats::venue::VenueWinRate;
use crate::MatchRecord;

/// Win/undecided tally between team A and team B
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub total_matches: u32,
    /// Draws, ties, no results and abandoned matches
    pub undecided: u32,
}

impl HeadToHead {
    /// True when the two teams never met (as opposed to never winning)
    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }

    /// Matches won by either side
    pub fn decided(&self) -> u32 {
        self.team_a_wins + self.team_b_wins
    }

    /// Same record seen from team B's side
    pub fn swapped(&self) -> Self {
        HeadToHead {
            team_a_wins: self.team_b_wins,
            team_b_wins: self.team_a_wins,
            ..*self
        }
    }
}

/// Tally the given matches for the pair (team_a, team_b)
///
/// Only matches between the pair count toward the total; a win counts only
/// if the winner is exactly one of the two teams.
pub fn tally<'a, I>(team_a: &str, team_b: &str, matches: I) -> HeadToHead
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut record = HeadToHead::default();
    for m in matches.into_iter().filter(|m| m.is_between(team_a, team_b)) {
        record.total_matches += 1;
        if m.won_by(team_a) {
            record.team_a_wins += 1;
        } else if m.won_by(team_b) {
            record.team_b_wins += 1;
        }
    }
    record.undecided = record.total_matches - record.decided();
    record
}

/// Pure statistics over a match store
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    store: &'a MatchStore,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a MatchStore) -> Self {
        Aggregator { store }
    }

    /// All matches between the two teams
    pub fn head_to_head(&self, team_a: &str, team_b: &str) -> HeadToHead {
        tally(team_a, team_b, self.store.matches_between(team_a, team_b, None))
    }

    /// Matches between the two teams at one venue; zero-valued when none
    pub fn head_to_head_at_venue(&self, team_a: &str, team_b: &str, venue: &str) -> HeadToHead {
        tally(
            team_a,
            team_b,
            self.store.matches_between(team_a, team_b, Some(venue)),
        )
    }

    /// Win percentages at a venue over decided matches between the pair
    pub fn venue_win_rate(&self, team_a: &str, team_b: &str, venue: &str) -> VenueWinRate {
        VenueWinRate::from_record(&self.head_to_head_at_venue(team_a, team_b, venue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawMatch;
    use proptest::prelude::*;

    const TEAMS: [&str; 4] = ["India", "Australia", "England", "Pakistan"];
    const VENUES: [&str; 3] = ["MCG", "Lord's", "Eden Gardens"];

    fn valid_teams() -> Vec<String> {
        TEAMS.iter().map(|t| t.to_string()).collect()
    }

    fn store(rows: Vec<RawMatch>) -> MatchStore {
        MatchStore::load(rows, &valid_teams())
    }

    #[test]
    fn test_india_australia_at_mcg() {
        let store = store(vec![
            RawMatch::new("India", "Australia", "India", "bat", "MCG", Some("India")),
            RawMatch::new("Australia", "India", "Australia", "field", "MCG", Some("Australia")),
            RawMatch::new("Australia", "India", "India", "bat", "MCG", Some("India")),
            RawMatch::new("India", "Australia", "India", "bat", "Lord's", None),
        ]);
        let agg = Aggregator::new(&store);

        let at_mcg = agg.head_to_head_at_venue("India", "Australia", "MCG");
        assert_eq!(
            at_mcg,
            HeadToHead {
                team_a_wins: 2,
                team_b_wins: 1,
                total_matches: 3,
                undecided: 0
            }
        );

        let overall = agg.head_to_head("India", "Australia");
        assert_eq!(overall.total_matches, 4);
        assert_eq!(overall.undecided, 1);

        match agg.venue_win_rate("India", "Australia", "MCG") {
            VenueWinRate::Available {
                team_a_pct,
                team_b_pct,
                undecided_count,
            } => {
                assert_eq!(team_a_pct, 66.7);
                assert_eq!(team_b_pct, 33.3);
                assert_eq!(undecided_count, 0);
            }
            other => panic!("expected available rate, got {:?}", other),
        }
    }

    #[test]
    fn test_no_matches_at_venue_is_zero_record() {
        let store = store(vec![RawMatch::new(
            "India", "England", "India", "bat", "Lord's", Some("England"),
        )]);
        let agg = Aggregator::new(&store);

        let record = agg.head_to_head_at_venue("India", "England", "MCG");
        assert_eq!(record, HeadToHead::default());
        assert!(record.is_empty());
        assert_eq!(
            agg.venue_win_rate("India", "England", "MCG"),
            VenueWinRate::Unavailable { undecided_count: 0 }
        );
    }

    #[test]
    fn test_all_undecided_is_unavailable() {
        let store = store(vec![
            RawMatch::new("India", "Pakistan", "India", "bat", "MCG", None),
            RawMatch::new("Pakistan", "India", "India", "field", "MCG", None),
        ]);
        let agg = Aggregator::new(&store);

        let record = agg.head_to_head_at_venue("India", "Pakistan", "MCG");
        assert_eq!(record.total_matches, 2);
        assert_eq!(record.undecided, 2);
        assert_eq!(
            agg.venue_win_rate("India", "Pakistan", "MCG"),
            VenueWinRate::Unavailable { undecided_count: 2 }
        );
    }

    #[test]
    fn test_swapped_team_roles_counted_by_identity() {
        // The same pair listed both ways round must not be split into two groups
        let store = store(vec![
            RawMatch::new("England", "Pakistan", "England", "bat", "Lord's", Some("Pakistan")),
            RawMatch::new("Pakistan", "England", "England", "bat", "Lord's", Some("Pakistan")),
            RawMatch::new("Pakistan", "England", "Pakistan", "bat", "Lord's", Some("England")),
        ]);
        let agg = Aggregator::new(&store);
        let record = agg.head_to_head("England", "Pakistan");
        assert_eq!(record.team_a_wins, 1);
        assert_eq!(record.team_b_wins, 2);
        assert_eq!(record.total_matches, 3);
    }

    fn raw_match_strategy() -> impl Strategy<Value = RawMatch> {
        (0..TEAMS.len(), 1..TEAMS.len(), 0..VENUES.len(), 0..4usize, any::<bool>()).prop_map(
            |(a, offset, venue, outcome, toss_bat)| {
                let team1 = TEAMS[a];
                let team2 = TEAMS[(a + offset) % TEAMS.len()];
                let winner = match outcome {
                    0 => Some(team1),
                    1 => Some(team2),
                    _ => None,
                };
                let decision = if toss_bat { "bat" } else { "field" };
                RawMatch::new(team1, team2, team1, decision, VENUES[venue], winner)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_head_to_head_is_symmetric(
            rows in prop::collection::vec(raw_match_strategy(), 0..60),
            a in 0..TEAMS.len(),
            b in 0..TEAMS.len(),
            v in 0..VENUES.len(),
        ) {
            prop_assume!(a != b);
            let store = store(rows);
            let agg = Aggregator::new(&store);

            let ab = agg.head_to_head(TEAMS[a], TEAMS[b]);
            let ba = agg.head_to_head(TEAMS[b], TEAMS[a]);
            prop_assert_eq!(ab.swapped(), ba);

            let ab_v = agg.head_to_head_at_venue(TEAMS[a], TEAMS[b], VENUES[v]);
            let ba_v = agg.head_to_head_at_venue(TEAMS[b], TEAMS[a], VENUES[v]);
            prop_assert_eq!(ab_v.swapped(), ba_v);
        }

        #[test]
        fn prop_counts_are_conserved(
            rows in prop::collection::vec(raw_match_strategy(), 0..60),
            a in 0..TEAMS.len(),
            b in 0..TEAMS.len(),
            v in 0..VENUES.len(),
        ) {
            prop_assume!(a != b);
            let store = store(rows);
            let agg = Aggregator::new(&store);

            for record in [
                agg.head_to_head(TEAMS[a], TEAMS[b]),
                agg.head_to_head_at_venue(TEAMS[a], TEAMS[b], VENUES[v]),
            ] {
                prop_assert_eq!(
                    record.team_a_wins + record.team_b_wins + record.undecided,
                    record.total_matches
                );
            }

            let overall = agg.head_to_head(TEAMS[a], TEAMS[b]);
            let by_venue: u32 = VENUES
                .iter()
                .map(|venue| agg.head_to_head_at_venue(TEAMS[a], TEAMS[b], venue).total_matches)
                .sum();
            prop_assert_eq!(overall.total_matches, by_venue);
        }

        #[test]
        fn prop_win_rates_sum_to_hundred(
            rows in prop::collection::vec(raw_match_strategy(), 1..60),
            a in 0..TEAMS.len(),
            b in 0..TEAMS.len(),
            v in 0..VENUES.len(),
        ) {
            prop_assume!(a != b);
            let store = store(rows);
            let agg = Aggregator::new(&store);
            if let VenueWinRate::Available { team_a_pct, team_b_pct, .. } =
                agg.venue_win_rate(TEAMS[a], TEAMS[b], VENUES[v])
            {
                prop_assert!((team_a_pct + team_b_pct - 100.0).abs() < 0.11);
            }
        }
    }
}
