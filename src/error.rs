use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the transform pipeline. All variants except
/// `InvariantViolation` are scoped to a single season and leave the
/// remaining seasons unaffected.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("season {season}: all {rows} raw rows were rejected")]
    MalformedSeasonData { season: String, rows: usize },

    #[error("season {season}: match references unknown team {team}")]
    UnknownTeamInSeason { season: String, team: String },

    #[error("season {season}: cutoff {cutoff} is before the first match date")]
    CutoffBeforeSeason { season: String, cutoff: NaiveDate },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl PipelineError {
    /// Invariant violations mean a bug in the table builder or snapshot
    /// generator; they abort the whole run instead of one season.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::InvariantViolation(_))
    }
}

/// Non-fatal data-quality annotations carried alongside a season's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonWarning {
    IncompleteRoster { expected: usize, found: usize },
}

impl fmt::Display for SeasonWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonWarning::IncompleteRoster { expected, found } => {
                write!(f, "incomplete roster: expected {expected} teams, found {found}")
            }
        }
    }
}
