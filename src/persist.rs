use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::pipeline::PipelineOutput;

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS raw_matches (
            match_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season TEXT NOT NULL,
            date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER NOT NULL,
            away_goals INTEGER NOT NULL,
            result TEXT NOT NULL CHECK(result IN ('H', 'D', 'A')),
            UNIQUE(season, date, home_team, away_team)
        );
        CREATE TABLE IF NOT EXISTS standings_snapshots (
            snapshot_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season TEXT NOT NULL,
            date TEXT NOT NULL,
            team TEXT NOT NULL,
            position INTEGER NOT NULL,
            played INTEGER NOT NULL,
            won INTEGER NOT NULL,
            drawn INTEGER NOT NULL,
            lost INTEGER NOT NULL,
            points INTEGER NOT NULL,
            goals_for INTEGER NOT NULL,
            goals_against INTEGER NOT NULL,
            goal_difference INTEGER NOT NULL,
            UNIQUE(season, date, team)
        );
        CREATE TABLE IF NOT EXISTS relegation_gaps (
            gap_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season TEXT NOT NULL,
            date TEXT NOT NULL,
            team TEXT NOT NULL,
            position INTEGER NOT NULL,
            points INTEGER NOT NULL,
            points_gap INTEGER NOT NULL,
            games_in_hand_adjusted_gap INTEGER NOT NULL,
            eventually_survived BOOLEAN,
            UNIQUE(season, date, team)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season_date ON raw_matches(season, date);
        CREATE INDEX IF NOT EXISTS idx_standings_season_date ON standings_snapshots(season, date);
        CREATE INDEX IF NOT EXISTS idx_gaps_season_team ON relegation_gaps(season, team);
        CREATE INDEX IF NOT EXISTS idx_gaps_survived ON relegation_gaps(eventually_survived);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistCounts {
    pub matches: usize,
    pub standings_rows: usize,
    pub gap_rows: usize,
}

/// Replace all three tables with the new run's output in one transaction, so
/// readers never see a mix of old and new derived rows.
pub fn replace_outputs(conn: &mut Connection, output: &PipelineOutput) -> Result<PersistCounts> {
    let tx = conn.transaction().context("begin replace transaction")?;
    tx.execute("DELETE FROM raw_matches", [])
        .context("clear raw_matches")?;
    tx.execute("DELETE FROM standings_snapshots", [])
        .context("clear standings_snapshots")?;
    tx.execute("DELETE FROM relegation_gaps", [])
        .context("clear relegation_gaps")?;

    let mut counts = PersistCounts { matches: 0, standings_rows: 0, gap_rows: 0 };
    {
        let mut insert_match = tx
            .prepare(
                "INSERT INTO raw_matches(season, date, home_team, away_team, home_goals, away_goals, result)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .context("prepare match insert")?;
        let mut insert_standing = tx
            .prepare(
                "INSERT INTO standings_snapshots(season, date, team, position, played, won, drawn, lost,
                                                 points, goals_for, goals_against, goal_difference)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .context("prepare standings insert")?;
        let mut insert_gap = tx
            .prepare(
                "INSERT INTO relegation_gaps(season, date, team, position, points, points_gap,
                                             games_in_hand_adjusted_gap, eventually_survived)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .context("prepare gaps insert")?;

        for season in &output.seasons {
            for m in &season.matches {
                insert_match
                    .execute(params![
                        m.season,
                        m.date,
                        m.home_team,
                        m.away_team,
                        m.home_goals as i64,
                        m.away_goals as i64,
                        m.result().code().to_string(),
                    ])
                    .context("insert match")?;
                counts.matches += 1;
            }
            for row in &season.snapshots.rows {
                insert_standing
                    .execute(params![
                        row.season,
                        row.as_of_date,
                        row.team,
                        row.position as i64,
                        row.played as i64,
                        row.won as i64,
                        row.drawn as i64,
                        row.lost as i64,
                        row.points as i64,
                        row.goals_for as i64,
                        row.goals_against as i64,
                        row.goal_difference as i64,
                    ])
                    .context("insert standings row")?;
                counts.standings_rows += 1;
            }
            for gap in &season.gaps {
                insert_gap
                    .execute(params![
                        gap.season,
                        gap.date,
                        gap.team,
                        gap.position as i64,
                        gap.points as i64,
                        gap.points_gap as i64,
                        gap.games_in_hand_adjusted_gap as i64,
                        gap.eventually_survived,
                    ])
                    .context("insert gap row")?;
                counts.gap_rows += 1;
            }
        }
    }
    tx.commit().context("commit replace transaction")?;
    Ok(counts)
}
