use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use log::warn;

use crate::error::PipelineError;
use crate::team_names::canonical_team_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    HomeWin,
    Draw,
    AwayWin,
}

impl MatchResult {
    pub fn code(self) -> char {
        match self {
            MatchResult::HomeWin => 'H',
            MatchResult::Draw => 'D',
            MatchResult::AwayWin => 'A',
        }
    }
}

/// One played match, normalized. Immutable fact; nothing downstream mutates
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub season: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl Match {
    pub fn result(&self) -> MatchResult {
        if self.home_goals > self.away_goals {
            MatchResult::HomeWin
        } else if self.home_goals < self.away_goals {
            MatchResult::AwayWin
        } else {
            MatchResult::Draw
        }
    }
}

/// Untyped row straight out of a source file. The loader owns turning this
/// into a `Match` or rejecting it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatchRow {
    pub season: String,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: String,
    pub away_goals: String,
}

#[derive(Debug, Clone)]
pub struct SeasonLoad {
    pub season: String,
    pub matches: Vec<Match>,
    pub rejected_rows: usize,
}

// Modern files use 4-digit years, the 90s files 2-digit, and re-exports are
// ISO. %y must be tried first: it consumes exactly two digits, so 4-digit
// years fall through to %Y, whereas %Y would swallow "95" as year 0095.
// chrono pivots %y at 69, which covers every season on record here.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"];

pub fn parse_match_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn parse_row(season: &str, row: &RawMatchRow) -> Option<Match> {
    let date = parse_match_date(&row.date)?;
    let home_team = canonical_team_name(&row.home_team);
    let away_team = canonical_team_name(&row.away_team);
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }
    let home_goals = row.home_goals.trim().parse::<u32>().ok()?;
    let away_goals = row.away_goals.trim().parse::<u32>().ok()?;
    Some(Match {
        season: season.to_string(),
        date,
        home_team,
        away_team,
        home_goals,
        away_goals,
    })
}

/// Parse one season's raw rows into date-ordered `Match` records. Bad rows
/// and repeats of an already-seen (date, home, away) fixture are counted and
/// skipped; a season where nothing parses fails outright.
pub fn load_season(season: &str, rows: &[RawMatchRow]) -> Result<SeasonLoad, PipelineError> {
    let mut matches = Vec::with_capacity(rows.len());
    let mut seen: BTreeSet<(NaiveDate, String, String)> = BTreeSet::new();
    let mut rejected = 0usize;
    for row in rows {
        match parse_row(season, row) {
            Some(parsed) => {
                let key = (parsed.date, parsed.home_team.clone(), parsed.away_team.clone());
                if seen.insert(key) {
                    matches.push(parsed);
                } else {
                    // A fixture exists once; a repeat would double-count in
                    // every table built from it.
                    rejected += 1;
                }
            }
            None => rejected += 1,
        }
    }
    if matches.is_empty() {
        return Err(PipelineError::MalformedSeasonData {
            season: season.to_string(),
            rows: rows.len(),
        });
    }
    if rejected > 0 {
        warn!("season {season}: rejected {rejected}/{} raw rows", rows.len());
    }
    // Stable sort keeps source order for same-day fixtures, so downstream
    // iteration is reproducible.
    matches.sort_by_key(|m| m.date);
    Ok(SeasonLoad {
        season: season.to_string(),
        matches,
        rejected_rows: rejected,
    })
}

/// Season id from a Football-Data file name, e.g. `0607.csv` -> "2006-07".
/// Two-digit years from 92 up are the 1900s; the league's record starts in
/// 1992-93.
pub fn season_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    if stem.len() < 4 || !stem.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let start_raw: u32 = stem[..2].parse().ok()?;
    let start = if start_raw >= 92 { 1900 + start_raw } else { 2000 + start_raw };
    Some(format!("{start}-{:02}", (start + 1) % 100))
}
