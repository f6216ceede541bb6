//! Precomputed aggregate tables
//!
//! Written by training as a cache for display. They are derived with the same
//! tally as the live aggregator, so the store remains the source of truth.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::MatchStore;
use crate::stats::head_to_head::tally;
use crate::stats::venue::VenueSummary;
use crate::Result;

pub const HEAD_TO_HEAD_FILE: &str = "head_to_head_stats.csv";
pub const HEAD_TO_HEAD_VENUE_FILE: &str = "head_to_head_venue_stats.csv";
pub const VENUE_FILE: &str = "venue_stats.csv";

/// Column order of `HeadToHeadRow`
const HEAD_TO_HEAD_COLUMNS: [&str; 6] = [
    "team_a",
    "team_b",
    "total",
    "team_a_wins",
    "team_b_wins",
    "undecided",
];

/// Column order of `VenueHeadToHeadRow`
const HEAD_TO_HEAD_VENUE_COLUMNS: [&str; 7] = [
    "team_a",
    "team_b",
    "venue",
    "total",
    "team_a_wins",
    "team_b_wins",
    "undecided",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadToHeadRow {
    pub team_a: String,
    pub team_b: String,
    pub total: u32,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub undecided: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueHeadToHeadRow {
    pub team_a: String,
    pub team_b: String,
    pub venue: String,
    pub total: u32,
    pub team_a_wins: u32,
    pub team_b_wins: u32,
    pub undecided: u32,
}

/// Paths of the written tables
#[derive(Debug, Clone)]
pub struct WrittenTables {
    pub head_to_head: PathBuf,
    pub head_to_head_venue: PathBuf,
    pub venues: PathBuf,
}

/// Unordered pairs of valid teams, in valid-team order
fn team_pairs(store: &MatchStore) -> Vec<(&str, &str)> {
    let teams = store.valid_teams();
    let mut pairs = Vec::new();
    for (i, a) in teams.iter().enumerate() {
        for b in &teams[i + 1..] {
            pairs.push((a.as_str(), b.as_str()));
        }
    }
    pairs
}

/// One row per pair that has met at least once
pub fn head_to_head_rows(store: &MatchStore) -> Vec<HeadToHeadRow> {
    team_pairs(store)
        .into_iter()
        .filter_map(|(a, b)| {
            let record = tally(a, b, store.records());
            (!record.is_empty()).then(|| HeadToHeadRow {
                team_a: a.to_string(),
                team_b: b.to_string(),
                total: record.total_matches,
                team_a_wins: record.team_a_wins,
                team_b_wins: record.team_b_wins,
                undecided: record.undecided,
            })
        })
        .collect()
}

/// One row per pair and venue where they have met
pub fn head_to_head_venue_rows(store: &MatchStore) -> Vec<VenueHeadToHeadRow> {
    let venues = store.venues();
    let mut rows = Vec::new();
    for (a, b) in team_pairs(store) {
        let between = store.matches_between(a, b, None);
        if between.is_empty() {
            continue;
        }
        for venue in &venues {
            let record = tally(a, b, between.iter().copied().filter(|m| m.venue == *venue));
            if record.is_empty() {
                continue;
            }
            rows.push(VenueHeadToHeadRow {
                team_a: a.to_string(),
                team_b: b.to_string(),
                venue: venue.to_string(),
                total: record.total_matches,
                team_a_wins: record.team_a_wins,
                team_b_wins: record.team_b_wins,
                undecided: record.undecided,
            });
        }
    }
    rows
}

pub fn venue_summaries(store: &MatchStore) -> Vec<VenueSummary> {
    store
        .venues()
        .into_iter()
        .map(|venue| VenueSummary::compute(store, venue))
        .collect()
}

/// Write all three tables into `dir`, creating it if needed
pub fn write_tables<P: AsRef<Path>>(store: &MatchStore, dir: P) -> Result<WrittenTables> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let written = WrittenTables {
        head_to_head: dir.join(HEAD_TO_HEAD_FILE),
        head_to_head_venue: dir.join(HEAD_TO_HEAD_VENUE_FILE),
        venues: dir.join(VENUE_FILE),
    };

    let pairs = head_to_head_rows(store);
    write_rows(&written.head_to_head, &HEAD_TO_HEAD_COLUMNS, &pairs)?;

    let venue_pairs = head_to_head_venue_rows(store);
    write_rows(
        &written.head_to_head_venue,
        &HEAD_TO_HEAD_VENUE_COLUMNS,
        &venue_pairs,
    )?;

    let summaries = venue_summaries(store);
    write_venue_table(store, &summaries, &written.venues)?;

    log::info!(
        "Wrote {} pair rows, {} pair/venue rows and {} venue rows to {}",
        pairs.len(),
        venue_pairs.len(),
        summaries.len(),
        dir.display()
    );

    Ok(written)
}

/// Header first, so a table with no rows is still a valid CSV
fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Wide table: wins per team, totals, then percentage per team
fn write_venue_table(store: &MatchStore, summaries: &[VenueSummary], path: &Path) -> Result<()> {
    let teams = store.valid_teams();
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["venue".to_string()];
    header.extend(teams.iter().cloned());
    header.push("total".to_string());
    header.push("undecided".to_string());
    header.extend(teams.iter().map(|t| format!("{}_pct", t)));
    writer.write_record(&header)?;

    for summary in summaries {
        let mut record = vec![summary.venue.clone()];
        record.extend(teams.iter().map(|t| summary.wins_for(t).to_string()));
        record.push(summary.decided.to_string());
        record.push(summary.undecided.to_string());
        record.extend(teams.iter().map(|t| {
            summary
                .win_pct(t)
                .map(|pct| format!("{:.1}", pct))
                .unwrap_or_default()
        }));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawMatch;

    fn store() -> MatchStore {
        let teams: Vec<String> = ["India", "Australia", "England"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        MatchStore::load(
            vec![
                RawMatch::new("India", "Australia", "India", "bat", "MCG", Some("India")),
                RawMatch::new("Australia", "India", "India", "bat", "MCG", Some("India")),
                RawMatch::new("Australia", "India", "Australia", "field", "SCG", None),
                RawMatch::new("England", "India", "England", "bat", "Lord's", Some("England")),
            ],
            &teams,
        )
    }

    #[test]
    fn test_pair_rows_merge_fixture_order() {
        let rows = head_to_head_rows(&store());
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            HeadToHeadRow {
                team_a: "India".to_string(),
                team_b: "Australia".to_string(),
                total: 3,
                team_a_wins: 2,
                team_b_wins: 0,
                undecided: 1,
            }
        );
        assert_eq!(rows[1].team_a, "India");
        assert_eq!(rows[1].team_b, "England");
        assert_eq!(rows[1].team_b_wins, 1);
    }

    #[test]
    fn test_venue_rows() {
        let rows = head_to_head_venue_rows(&store());
        let venues: Vec<&str> = rows.iter().map(|r| r.venue.as_str()).collect();
        assert_eq!(venues, vec!["MCG", "SCG", "Lord's"]);
        assert_eq!(rows[0].total, 2);
        assert_eq!(rows[1].undecided, 1);
    }

    #[test]
    fn test_write_tables() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_tables(&store(), dir.path().join("stats")).unwrap();

        let h2h = std::fs::read_to_string(&written.head_to_head).unwrap();
        let mut lines = h2h.lines();
        assert_eq!(
            lines.next(),
            Some("team_a,team_b,total,team_a_wins,team_b_wins,undecided")
        );
        assert_eq!(lines.next(), Some("India,Australia,3,2,0,1"));

        let venues = std::fs::read_to_string(&written.venues).unwrap();
        let mut lines = venues.lines();
        assert_eq!(
            lines.next(),
            Some("venue,India,Australia,England,total,undecided,India_pct,Australia_pct,England_pct")
        );
        assert_eq!(lines.next(), Some("MCG,2,0,0,2,0,100.0,0.0,0.0"));
        assert_eq!(lines.next(), Some("SCG,0,0,0,0,1,,,"));
    }

    #[test]
    fn test_venue_pair_table_columns() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_tables(&store(), dir.path()).unwrap();

        let text = std::fs::read_to_string(&written.head_to_head_venue).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("team_a,team_b,venue,total,team_a_wins,team_b_wins,undecided")
        );
        assert_eq!(lines.next(), Some("India,Australia,MCG,2,2,0,0"));
    }

    #[test]
    fn test_empty_tables_keep_headers() {
        let teams: Vec<String> = ["India", "Australia"].iter().map(|t| t.to_string()).collect();
        let store = MatchStore::load(Vec::new(), &teams);
        let dir = tempfile::tempdir().unwrap();
        let written = write_tables(&store, dir.path()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&written.head_to_head).unwrap(),
            "team_a,team_b,total,team_a_wins,team_b_wins,undecided\n"
        );
        assert_eq!(
            std::fs::read_to_string(&written.head_to_head_venue).unwrap(),
            "team_a,team_b,venue,total,team_a_wins,team_b_wins,undecided\n"
        );
        assert_eq!(
            std::fs::read_to_string(&written.venues).unwrap(),
            "venue,India,Australia,total,undecided,India_pct,Australia_pct\n"
        );
    }
}
