use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};

use crate::gaps::GapRecord;
use crate::standings::StandingsRow;

/// The table as it stood on one date, in position order.
pub fn table_at_date(conn: &Connection, season: &str, date: NaiveDate) -> Result<Vec<StandingsRow>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, date, team, position, played, won, drawn, lost,
                   points, goals_for, goals_against, goal_difference
            FROM standings_snapshots
            WHERE season = ?1 AND date = ?2
            ORDER BY position ASC
            "#,
        )
        .context("prepare standings query")?;

    let rows = stmt
        .query_map(params![season, date], |row| {
            Ok(StandingsRow {
                season: row.get(0)?,
                as_of_date: row.get(1)?,
                team: row.get(2)?,
                position: row.get::<_, i64>(3)? as usize,
                played: row.get::<_, i64>(4)? as u32,
                won: row.get::<_, i64>(5)? as u32,
                drawn: row.get::<_, i64>(6)? as u32,
                lost: row.get::<_, i64>(7)? as u32,
                points: row.get::<_, i64>(8)? as u32,
                goals_for: row.get::<_, i64>(9)? as u32,
                goals_against: row.get::<_, i64>(10)? as u32,
                goal_difference: row.get::<_, i64>(11)? as i32,
            })
        })
        .context("query standings")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode standings row")?);
    }
    Ok(out)
}

/// One team's gap series across a season, date order.
pub fn gap_series(conn: &Connection, season: &str, team: &str) -> Result<Vec<GapRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT season, date, team, position, points, points_gap,
                   games_in_hand_adjusted_gap, eventually_survived
            FROM relegation_gaps
            WHERE season = ?1 AND team = ?2
            ORDER BY date ASC
            "#,
        )
        .context("prepare gap series query")?;

    let rows = stmt
        .query_map(params![season, team], decode_gap_row)
        .context("query gap series")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode gap row")?);
    }
    Ok(out)
}

/// Largest gap ever overcome by a team that stayed up: the "great escape"
/// record.
pub fn max_gap_survived(conn: &Connection) -> Result<Option<GapRecord>> {
    conn.query_row(
        r#"
        SELECT season, date, team, position, points, points_gap,
               games_in_hand_adjusted_gap, eventually_survived
        FROM relegation_gaps
        WHERE eventually_survived = 1
        ORDER BY points_gap DESC, date ASC
        LIMIT 1
        "#,
        [],
        decode_gap_row,
    )
    .optional()
    .context("query max gap survived")
}

fn decode_gap_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GapRecord> {
    Ok(GapRecord {
        season: row.get(0)?,
        date: row.get(1)?,
        team: row.get(2)?,
        position: row.get::<_, i64>(3)? as usize,
        points: row.get::<_, i64>(4)? as u32,
        points_gap: row.get::<_, i64>(5)? as i32,
        games_in_hand_adjusted_gap: row.get::<_, i64>(6)? as i32,
        eventually_survived: row.get(7)?,
    })
}
