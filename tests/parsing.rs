use chrono::NaiveDate;

use epl_terrain::error::PipelineError;
use epl_terrain::loader::{RawMatchRow, load_season};
use epl_terrain::pipeline::{self, PipelineConfig};

fn raw(season: &str, date: &str, home: &str, away: &str, hg: &str, ag: &str) -> RawMatchRow {
    RawMatchRow {
        season: season.to_string(),
        date: date.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        home_goals: hg.to_string(),
        away_goals: ag.to_string(),
    }
}

#[test]
fn loads_mixed_date_formats_in_one_season() {
    let rows = vec![
        raw("1995-96", "19/08/95", "Leeds", "Liverpool", "1", "0"),
        raw("1995-96", "20/08/1995", "Everton", "Chelsea", "2", "3"),
        raw("1995-96", "1995-08-23", "Arsenal", "Coventry", "0", "0"),
    ];
    let load = load_season("1995-96", &rows).expect("season loads");
    assert_eq!(load.rejected_rows, 0);
    // Every era must land in the same real-world year; a two-digit year
    // swallowed by a four-digit format would stamp rows in century one.
    let dates: Vec<NaiveDate> = load.matches.iter().map(|m| m.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(1995, 8, 19).expect("valid date"),
            NaiveDate::from_ymd_opt(1995, 8, 20).expect("valid date"),
            NaiveDate::from_ymd_opt(1995, 8, 23).expect("valid date"),
        ]
    );
}

#[test]
fn bad_rows_are_counted_not_fatal() {
    let rows = vec![
        raw("2006-07", "19/08/2006", "Arsenal", "Aston Villa", "1", "1"),
        raw("2006-07", "not a date", "Chelsea", "Everton", "2", "0"),
        raw("2006-07", "20/08/2006", "Fulham", "Bolton", "", "1"),
        raw("2006-07", "20/08/2006", "Reading", "Middlesbrough", "3", "2"),
    ];
    let load = load_season("2006-07", &rows).expect("season loads");
    assert_eq!(load.rejected_rows, 2);
    assert_eq!(load.matches.len(), 2);
}

#[test]
fn all_rows_rejected_fails_the_season() {
    let rows = vec![
        raw("2006-07", "??", "Chelsea", "Everton", "2", "0"),
        raw("2006-07", "", "Fulham", "Bolton", "x", "1"),
    ];
    let err = load_season("2006-07", &rows).expect_err("nothing parses");
    match err {
        PipelineError::MalformedSeasonData { season, rows } => {
            assert_eq!(season, "2006-07");
            assert_eq!(rows, 2);
        }
        other => panic!("expected MalformedSeasonData, got {other}"),
    }
}

#[test]
fn same_day_fixtures_keep_source_order() {
    let rows = vec![
        raw("2006-07", "20/08/2006", "Zeta", "Alpha", "1", "0"),
        raw("2006-07", "19/08/2006", "Gamma", "Delta", "1", "0"),
        raw("2006-07", "20/08/2006", "Beta", "Epsilon", "1", "0"),
    ];
    let load = load_season("2006-07", &rows).expect("season loads");
    let order: Vec<&str> = load.matches.iter().map(|m| m.home_team.as_str()).collect();
    assert_eq!(order, vec!["Gamma", "Zeta", "Beta"]);
}

#[test]
fn duplicate_fixtures_are_rejected_not_double_counted() {
    let rows = vec![
        raw("2006-07", "19/08/2006", "Arsenal", "Aston Villa", "1", "1"),
        raw("2006-07", "19/08/2006", "Arsenal", "Aston Villa", "1", "1"),
        // Same pairing on another date is a legitimate rearranged fixture.
        raw("2006-07", "20/12/2006", "Arsenal", "Aston Villa", "2", "0"),
        // Reverse fixture on the same day is distinct.
        raw("2006-07", "19/08/2006", "Aston Villa", "Arsenal", "0", "0"),
    ];
    let load = load_season("2006-07", &rows).expect("season loads");
    assert_eq!(load.rejected_rows, 1);
    assert_eq!(load.matches.len(), 3);
}

#[test]
fn loader_normalizes_team_names() {
    let rows = vec![raw("2006-07", "19/08/2006", "Man United", "Spurs", "2", "1")];
    let load = load_season("2006-07", &rows).expect("season loads");
    assert_eq!(load.matches[0].home_team, "Manchester Utd");
    assert_eq!(load.matches[0].away_team, "Tottenham Hotspur");
}

#[test]
fn one_bad_season_does_not_block_the_others() {
    let mut rows = vec![
        raw("2005-06", "garbage", "Arsenal", "Chelsea", "1", "0"),
        raw("2005-06", "also garbage", "Everton", "Fulham", "0", "0"),
    ];
    for (date, home, away) in [
        ("19/08/2006", "Arsenal", "Aston Villa"),
        ("19/08/2006", "Bolton", "Chelsea"),
        ("26/08/2006", "Aston Villa", "Bolton"),
        ("26/08/2006", "Chelsea", "Arsenal"),
    ] {
        rows.push(raw("2006-07", date, home, away, "1", "0"));
    }

    let output = pipeline::run(rows, &PipelineConfig::default()).expect("run completes");
    assert_eq!(output.summary.seasons_processed, 1);
    assert_eq!(output.seasons.len(), 1);
    assert_eq!(output.seasons[0].season, "2006-07");
    assert_eq!(output.summary.seasons_failed.len(), 1);
    assert_eq!(output.summary.seasons_failed[0].0, "2005-06");
}

#[test]
fn rerunning_the_pipeline_is_deterministic() {
    let mut rows = Vec::new();
    for (date, home, hg, away, ag) in [
        ("19/08/2006", "Arsenal", 1, "Aston Villa", 1),
        ("19/08/2006", "Bolton", 2, "Chelsea", 0),
        ("23/08/2006", "Chelsea", 3, "Arsenal", 0),
        ("26/08/2006", "Aston Villa", 0, "Bolton", 2),
        ("02/09/2006", "Arsenal", 2, "Bolton", 1),
        ("02/09/2006", "Chelsea", 1, "Aston Villa", 0),
    ] {
        rows.push(raw("2006-07", date, home, away, &hg.to_string(), &ag.to_string()));
    }

    let first = pipeline::run(rows.clone(), &PipelineConfig::default()).expect("first run");
    let second = pipeline::run(rows, &PipelineConfig::default()).expect("second run");
    assert_eq!(first, second);
}
