use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::loader::Match;

/// One team's cumulative record on one date, with its rank in that day's
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsRow {
    pub season: String,
    pub team: String,
    pub as_of_date: NaiveDate,
    pub position: usize,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamTally {
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamTally {
    pub fn points(&self) -> u32 {
        3 * self.won + self.drawn
    }

    pub fn goal_difference(&self) -> i32 {
        self.goals_for as i32 - self.goals_against as i32
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if scored > conceded {
            self.won += 1;
        } else if scored == conceded {
            self.drawn += 1;
        } else {
            self.lost += 1;
        }
    }
}

/// Cumulative per-team state for one season. The roster is fixed at
/// construction; day-steps return a new state instead of mutating in place,
/// so a single step is testable in isolation and seasons can run in
/// parallel.
#[derive(Debug, Clone)]
pub struct SeasonState {
    season: String,
    tallies: BTreeMap<String, TeamTally>,
}

impl SeasonState {
    pub fn new(season: &str, roster: &BTreeSet<String>) -> Self {
        let tallies = roster
            .iter()
            .map(|team| (team.clone(), TeamTally::default()))
            .collect();
        Self { season: season.to_string(), tallies }
    }

    pub fn roster_len(&self) -> usize {
        self.tallies.len()
    }

    /// Fold one day's results into a new state. Every match team must be in
    /// the roster.
    pub fn apply_day(&self, matches: &[&Match]) -> Result<SeasonState, PipelineError> {
        let mut next = self.clone();
        for m in matches {
            for (team, scored, conceded) in [
                (&m.home_team, m.home_goals, m.away_goals),
                (&m.away_team, m.away_goals, m.home_goals),
            ] {
                let tally = next.tallies.get_mut(team).ok_or_else(|| {
                    PipelineError::UnknownTeamInSeason {
                        season: self.season.clone(),
                        team: team.clone(),
                    }
                })?;
                tally.record(scored, conceded);
            }
        }
        Ok(next)
    }

    /// Ranked table as of a date. Official tie-break order as a single
    /// composite sort key: points, goal difference, goals scored, then team
    /// name, so the order is a strict total order even on full ties. Teams
    /// yet to play rank on all-zero records; the table is never partial.
    pub fn table(&self, as_of_date: NaiveDate) -> Result<Vec<StandingsRow>, PipelineError> {
        let mut ranked: Vec<(&String, &TeamTally)> = self.tallies.iter().collect();
        ranked.sort_by_key(|(team, tally)| {
            (
                Reverse(tally.points()),
                Reverse(tally.goal_difference()),
                Reverse(tally.goals_for),
                (*team).clone(),
            )
        });
        let rows: Vec<StandingsRow> = ranked
            .iter()
            .enumerate()
            .map(|(index, (team, tally))| StandingsRow {
                season: self.season.clone(),
                team: (*team).clone(),
                as_of_date,
                position: index + 1,
                played: tally.played,
                won: tally.won,
                drawn: tally.drawn,
                lost: tally.lost,
                goals_for: tally.goals_for,
                goals_against: tally.goals_against,
                goal_difference: tally.goal_difference(),
                points: tally.points(),
            })
            .collect();
        verify_table(&rows)?;
        Ok(rows)
    }
}

/// Positions must be exactly 1..N with no duplicate teams. A failure here is
/// a bug upstream, never recoverable.
pub fn verify_table(rows: &[StandingsRow]) -> Result<(), PipelineError> {
    let mut seen = BTreeSet::new();
    for (index, row) in rows.iter().enumerate() {
        if row.position != index + 1 {
            return Err(PipelineError::InvariantViolation(format!(
                "non-contiguous position {} at rank {} on {}",
                row.position,
                index + 1,
                row.as_of_date
            )));
        }
        if !seen.insert(row.team.as_str()) {
            return Err(PipelineError::InvariantViolation(format!(
                "duplicate team {} in table on {}",
                row.team, row.as_of_date
            )));
        }
    }
    Ok(())
}

/// Table from all matches up to and including the cutoff date.
pub fn table_as_of(
    season: &str,
    matches: &[Match],
    roster: &BTreeSet<String>,
    cutoff: NaiveDate,
) -> Result<Vec<StandingsRow>, PipelineError> {
    if let Some(first) = matches.iter().map(|m| m.date).min()
        && cutoff < first
    {
        return Err(PipelineError::CutoffBeforeSeason {
            season: season.to_string(),
            cutoff,
        });
    }
    let played: Vec<&Match> = matches.iter().filter(|m| m.date <= cutoff).collect();
    let state = SeasonState::new(season, roster).apply_day(&played)?;
    state.table(cutoff)
}
