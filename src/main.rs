use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use epl_terrain::loader::{self, RawMatchRow};
use epl_terrain::persist;
use epl_terrain::pipeline::{self, PipelineConfig};
use epl_terrain::queries;
use epl_terrain::season_format;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data/raw".to_string()));
    let db_path = PathBuf::from(args.next().unwrap_or_else(|| "data/epl_terrain.db".to_string()));

    let rows = read_raw_rows(&data_dir)?;

    let mut config = PipelineConfig::default();
    if let Ok(path) = env::var("SEASON_FORMATS") {
        config.format_overrides = season_format::load_format_overrides(Path::new(&path))?;
    }

    let output = pipeline::run(rows, &config)?;
    let mut conn = persist::open_db(&db_path)?;
    let counts = persist::replace_outputs(&mut conn, &output)?;

    println!("Pipeline complete");
    println!("DB: {}", db_path.display());
    println!("Seasons processed: {}", output.summary.seasons_processed);
    println!("Snapshot days: {}", output.summary.snapshot_days);
    println!(
        "Rows written: {} matches, {} standings, {} gaps",
        counts.matches, counts.standings_rows, counts.gap_rows
    );
    if output.summary.rejected_rows > 0 {
        println!("Rejected raw rows: {}", output.summary.rejected_rows);
    }
    if !output.summary.seasons_failed.is_empty() {
        println!("Failed seasons:");
        for (season, reason) in &output.summary.seasons_failed {
            println!(" - {season}: {reason}");
        }
    }
    for season in &output.seasons {
        for warning in &season.snapshots.warnings {
            println!("Warning {}: {warning}", season.season);
        }
    }

    if let Some(record) = queries::max_gap_survived(&conn)? {
        println!(
            "Biggest gap overcome: {} pts ({} adjusted) by {} on {} ({})",
            record.points_gap,
            record.games_in_hand_adjusted_gap,
            record.team,
            record.date,
            record.season
        );
    }
    Ok(())
}

fn read_raw_rows(data_dir: &Path) -> Result<Vec<RawMatchRow>> {
    let mut files: Vec<PathBuf> = fs::read_dir(data_dir)
        .with_context(|| format!("read data dir {}", data_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    let mut rows = Vec::new();
    for path in files {
        let Some(season) = loader::season_from_filename(&path) else {
            warn!("skipping {}: cannot infer season from filename", path.display());
            continue;
        };
        let before = rows.len();
        read_season_csv(&path, &season, &mut rows)?;
        info!("{}: {} rows ({season})", path.display(), rows.len() - before);
    }
    if rows.is_empty() {
        bail!("no usable csv rows under {}", data_dir.display());
    }
    Ok(rows)
}

fn read_season_csv(path: &Path, season: &str, out: &mut Vec<RawMatchRow>) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv {}", path.display()))?;

    // Column layouts vary by era; resolve the columns we need by header name.
    let headers = reader
        .byte_headers()
        .with_context(|| format!("read csv headers in {}", path.display()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| latin1_field(h) == name);
    let (Some(date), Some(home), Some(away), Some(home_goals), Some(away_goals)) = (
        column("Date"),
        column("HomeTeam"),
        column("AwayTeam"),
        column("FTHG"),
        column("FTAG"),
    ) else {
        bail!("{}: missing required columns", path.display());
    };

    for record in reader.byte_records() {
        let record = record.with_context(|| format!("read csv record in {}", path.display()))?;
        let field = |index: usize| record.get(index).map(latin1_field).unwrap_or_default();
        let row = RawMatchRow {
            season: season.to_string(),
            date: field(date),
            home_team: field(home),
            away_team: field(away),
            home_goals: field(home_goals),
            away_goals: field(away_goals),
        };
        // Older files pad the tail with fully blank rows.
        if row.date.is_empty() && row.home_team.is_empty() {
            continue;
        }
        out.push(row);
    }
    Ok(())
}

// Pre-2003 Football-Data files are Latin-1, not UTF-8; map bytes straight to
// chars instead of trusting the encoding.
fn latin1_field(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect::<String>().trim().to_string()
}
