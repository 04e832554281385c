use std::collections::{BTreeMap, HashMap};

use log::{error, info};
use rayon::prelude::*;

use crate::error::PipelineError;
use crate::gaps::{self, GapRecord};
use crate::loader::{self, Match, RawMatchRow};
use crate::season_format::{self, SeasonFormat};
use crate::snapshots::{self, SeasonSnapshots};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Per-season league-shape overrides on top of the built-in historical
    /// table.
    pub format_overrides: HashMap<String, SeasonFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonOutput {
    pub season: String,
    pub format: SeasonFormat,
    pub matches: Vec<Match>,
    pub snapshots: SeasonSnapshots,
    pub gaps: Vec<GapRecord>,
    pub rejected_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub seasons_processed: usize,
    pub seasons_failed: Vec<(String, String)>,
    pub snapshot_days: usize,
    pub snapshot_rows: usize,
    pub gap_records: usize,
    pub rejected_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub seasons: Vec<SeasonOutput>,
    pub summary: PipelineSummary,
}

/// Run the full transform: group raw rows by season, process each season
/// independently, and collect per-season failures into the summary instead
/// of aborting the batch. Invariant violations are the exception: they stop
/// the whole run rather than let a corrupted table reach persistence.
///
/// Seasons have no cross-season data dependency, so they fan out across the
/// rayon pool; output order is by season id either way.
pub fn run(rows: Vec<RawMatchRow>, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let mut by_season: BTreeMap<String, Vec<RawMatchRow>> = BTreeMap::new();
    for row in rows {
        by_season.entry(row.season.clone()).or_default().push(row);
    }

    let results: Vec<Result<SeasonOutput, (String, PipelineError)>> = by_season
        .par_iter()
        .map(|(season, season_rows)| {
            process_season(season, season_rows, config).map_err(|err| (season.clone(), err))
        })
        .collect();

    let mut seasons = Vec::new();
    let mut summary = PipelineSummary::default();
    for result in results {
        match result {
            Ok(output) => {
                summary.seasons_processed += 1;
                summary.snapshot_days += output.snapshots.snapshot_days();
                summary.snapshot_rows += output.snapshots.rows.len();
                summary.gap_records += output.gaps.len();
                summary.rejected_rows += output.rejected_rows;
                seasons.push(output);
            }
            Err((season, err)) if err.is_fatal() => {
                error!("season {season}: {err}");
                return Err(err);
            }
            Err((season, err)) => {
                error!("season {season} failed: {err}");
                summary.seasons_failed.push((season, err.to_string()));
            }
        }
    }
    seasons.sort_by(|a, b| a.season.cmp(&b.season));

    info!(
        "pipeline done: {} seasons, {} snapshot days, {} snapshot rows, {} gap records, {} failed",
        summary.seasons_processed,
        summary.snapshot_days,
        summary.snapshot_rows,
        summary.gap_records,
        summary.seasons_failed.len()
    );
    Ok(PipelineOutput { seasons, summary })
}

fn process_season(
    season: &str,
    rows: &[RawMatchRow],
    config: &PipelineConfig,
) -> Result<SeasonOutput, PipelineError> {
    let load = loader::load_season(season, rows)?;
    let format = season_format::format_for_season(season, &config.format_overrides);
    let season_snapshots = snapshots::build_season_snapshots(season, &load.matches, format)?;
    let gap_records = gaps::build_gap_records(&season_snapshots, format)?;
    info!(
        "season {season}: {} matches, {} snapshot days, {} gap records",
        load.matches.len(),
        season_snapshots.snapshot_days(),
        gap_records.len()
    );
    Ok(SeasonOutput {
        season: season.to_string(),
        format,
        matches: load.matches,
        snapshots: season_snapshots,
        gaps: gap_records,
        rejected_rows: load.rejected_rows,
    })
}
