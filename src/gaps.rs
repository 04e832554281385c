use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::PipelineError;
use crate::season_format::SeasonFormat;
use crate::snapshots::SeasonSnapshots;

/// A team's distance from relegation safety on one date.
///
/// Sign convention: `points_gap` is the deficit to the team holding the
/// safety-line position, so positive means in danger, negative means clear,
/// and zero means level with the line. The team at the line itself is gap 0
/// and counts as at risk for threshold analyses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapRecord {
    pub season: String,
    pub team: String,
    pub date: NaiveDate,
    pub position: usize,
    pub points: u32,
    pub points_gap: i32,
    pub games_in_hand_adjusted_gap: i32,
    pub eventually_survived: Option<bool>,
}

/// A season counts as concluded once every roster team has played the full
/// home-and-away schedule on the final snapshot day. The in-progress season
/// never satisfies this, so its outcomes stay unresolved.
pub fn season_concluded(snapshots: &SeasonSnapshots, format: SeasonFormat) -> bool {
    match snapshots.final_table() {
        Some(rows) if !rows.is_empty() => {
            rows.iter().all(|row| row.played == format.full_schedule_games())
        }
        _ => false,
    }
}

/// Gap metrics for every snapshot row, with survival outcomes back-filled
/// from the final table when the season has concluded.
pub fn build_gap_records(
    snapshots: &SeasonSnapshots,
    format: SeasonFormat,
) -> Result<Vec<GapRecord>, PipelineError> {
    let teams = snapshots.roster.len();
    if teams == 0 || snapshots.rows.len() % teams != 0 {
        return Err(PipelineError::InvariantViolation(format!(
            "season {}: {} snapshot rows do not tile a roster of {}",
            snapshots.season,
            snapshots.rows.len(),
            teams
        )));
    }

    let safety_position = format.safety_position();

    // Outcome back-fill is a separate lookup keyed on the final table, not
    // threaded through the day walk.
    let mut survived: BTreeMap<&str, bool> = BTreeMap::new();
    if season_concluded(snapshots, format)
        && let Some(final_rows) = snapshots.final_table()
    {
        for row in final_rows {
            survived.insert(row.team.as_str(), row.position <= safety_position);
        }
    }

    let mut out = Vec::with_capacity(snapshots.rows.len());
    for day_rows in snapshots.rows.chunks(teams) {
        let Some(safety_row) = day_rows.iter().find(|row| row.position == safety_position)
        else {
            // Rosters smaller than the safety position never occupy the
            // line; nothing to measure on such days.
            continue;
        };
        let safety_points = safety_row.points as i32;
        let safety_played = safety_row.played as i32;
        for row in day_rows {
            let points_gap = safety_points - row.points as i32;
            // Games in hand relative to the safety-line team, worth up to 3
            // points each. A distinct metric, never substituted for the
            // absolute gap.
            let games_in_hand = safety_played - row.played as i32;
            out.push(GapRecord {
                season: row.season.clone(),
                team: row.team.clone(),
                date: row.as_of_date,
                position: row.position,
                points: row.points,
                points_gap,
                games_in_hand_adjusted_gap: points_gap - 3 * games_in_hand,
                eventually_survived: survived.get(row.team.as_str()).copied(),
            });
        }
    }
    Ok(out)
}
