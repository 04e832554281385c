use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::warn;

use crate::error::{PipelineError, SeasonWarning};
use crate::loader::Match;
use crate::season_format::SeasonFormat;
use crate::standings::{SeasonState, StandingsRow};

/// Daily standings for one season: every roster team, every calendar day
/// from the first to the last match date inclusive. Rows are laid out
/// date-major, `roster.len()` per day, position order within a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSnapshots {
    pub season: String,
    pub roster: BTreeSet<String>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub rows: Vec<StandingsRow>,
    pub warnings: Vec<SeasonWarning>,
}

impl SeasonSnapshots {
    pub fn snapshot_days(&self) -> usize {
        (self.last_date - self.first_date).num_days() as usize + 1
    }

    /// The full table on one day, in position order.
    pub fn rows_on(&self, date: NaiveDate) -> Option<&[StandingsRow]> {
        if date < self.first_date || date > self.last_date {
            return None;
        }
        let teams = self.roster.len();
        let offset = (date - self.first_date).num_days() as usize * teams;
        self.rows.get(offset..offset + teams)
    }

    pub fn final_table(&self) -> Option<&[StandingsRow]> {
        self.rows_on(self.last_date)
    }
}

/// Every team that appears in any match of the season. Computed once up
/// front and iterated for every day's table, so forward-filled days can
/// never drop a non-playing team.
pub fn season_roster(matches: &[Match]) -> BTreeSet<String> {
    let mut roster = BTreeSet::new();
    for m in matches {
        roster.insert(m.home_team.clone());
        roster.insert(m.away_team.clone());
    }
    roster
}

/// Walk the season calendar day by day. Match days recompute the table;
/// blank days carry the entire previous table forward with only the date
/// restamped.
pub fn build_season_snapshots(
    season: &str,
    matches: &[Match],
    format: SeasonFormat,
) -> Result<SeasonSnapshots, PipelineError> {
    if matches.is_empty() {
        return Err(PipelineError::MalformedSeasonData {
            season: season.to_string(),
            rows: 0,
        });
    }

    let roster = season_roster(matches);
    let mut warnings = Vec::new();
    if roster.len() < format.roster_size {
        warn!(
            "season {season}: only {} of {} expected teams present",
            roster.len(),
            format.roster_size
        );
        warnings.push(SeasonWarning::IncompleteRoster {
            expected: format.roster_size,
            found: roster.len(),
        });
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        by_date.entry(m.date).or_default().push(m);
    }
    let (first_date, last_date) = match (by_date.keys().next(), by_date.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(PipelineError::MalformedSeasonData {
                season: season.to_string(),
                rows: 0,
            });
        }
    };

    let days = (last_date - first_date).num_days() as usize + 1;
    let mut rows = Vec::with_capacity(days * roster.len());
    let mut state = SeasonState::new(season, &roster);
    let mut current_day: Vec<StandingsRow> = Vec::new();
    let mut day = first_date;
    while day <= last_date {
        match by_date.get(&day) {
            Some(played) => {
                state = state.apply_day(played)?;
                current_day = state.table(day)?;
            }
            None => {
                for row in &mut current_day {
                    row.as_of_date = day;
                }
            }
        }
        rows.extend(current_day.iter().cloned());
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    Ok(SeasonSnapshots {
        season: season.to_string(),
        roster,
        first_date,
        last_date,
        rows,
        warnings,
    })
}
