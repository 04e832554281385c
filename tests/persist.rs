use chrono::NaiveDate;
use rusqlite::Connection;

use epl_terrain::pipeline::{self, PipelineConfig, PipelineOutput};
use epl_terrain::loader::RawMatchRow;
use epl_terrain::persist;
use epl_terrain::queries;
use epl_terrain::season_format::SeasonFormat;

fn d(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

// Same four-club league as the gap tests, fed through the raw-row front
// door: one relegation slot, strict hierarchy, every result 2-0.
fn sample_output() -> PipelineOutput {
    let fixtures = [
        ("06/01/2024", "Avon", "Byfleet"),
        ("06/01/2024", "Croft", "Denham"),
        ("13/01/2024", "Avon", "Croft"),
        ("13/01/2024", "Byfleet", "Denham"),
        ("20/01/2024", "Avon", "Denham"),
        ("20/01/2024", "Byfleet", "Croft"),
        ("27/01/2024", "Byfleet", "Avon"),
        ("27/01/2024", "Denham", "Croft"),
        ("03/02/2024", "Croft", "Avon"),
        ("03/02/2024", "Denham", "Byfleet"),
        ("10/02/2024", "Denham", "Avon"),
        ("10/02/2024", "Croft", "Byfleet"),
    ];
    let strength = |team: &str| match team {
        "Avon" => 3,
        "Byfleet" => 2,
        "Croft" => 1,
        _ => 0,
    };
    let rows: Vec<RawMatchRow> = fixtures
        .iter()
        .map(|(date, home, away)| {
            let home_wins = strength(home) > strength(away);
            RawMatchRow {
                season: "2023-24".to_string(),
                date: date.to_string(),
                home_team: home.to_string(),
                away_team: away.to_string(),
                home_goals: if home_wins { "2" } else { "0" }.to_string(),
                away_goals: if home_wins { "0" } else { "2" }.to_string(),
            }
        })
        .collect();

    let config = PipelineConfig {
        format_overrides: [("2023-24".to_string(), SeasonFormat::new(4, 1))].into(),
    };
    pipeline::run(rows, &config).expect("pipeline run")
}

fn fresh_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    persist::init_schema(&conn).expect("schema");
    conn
}

#[test]
fn persisted_tables_round_trip_through_queries() {
    let output = sample_output();
    let mut conn = fresh_db();
    let counts = persist::replace_outputs(&mut conn, &output).expect("persist");

    assert_eq!(counts.matches, 12);
    assert_eq!(counts.standings_rows, output.seasons[0].snapshots.rows.len());
    assert_eq!(counts.gap_rows, output.seasons[0].gaps.len());

    let date = d("2024-01-13");
    let table = queries::table_at_date(&conn, "2023-24", date).expect("table query");
    assert_eq!(table, output.seasons[0].snapshots.rows_on(date).expect("day").to_vec());

    let series = queries::gap_series(&conn, "2023-24", "Denham").expect("gap query");
    assert_eq!(series.len(), output.seasons[0].snapshots.snapshot_days());
    assert!(series.windows(2).all(|pair| pair[0].date < pair[1].date));
    assert!(series.iter().all(|g| g.eventually_survived == Some(false)));
}

#[test]
fn replace_is_a_full_swap_not_an_append() {
    let output = sample_output();
    let mut conn = fresh_db();
    persist::replace_outputs(&mut conn, &output).expect("first persist");
    let counts = persist::replace_outputs(&mut conn, &output).expect("second persist");

    for (table, expected) in [
        ("raw_matches", counts.matches),
        ("standings_snapshots", counts.standings_rows),
        ("relegation_gaps", counts.gap_rows),
    ] {
        let stored: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count");
        assert_eq!(stored as usize, expected, "{table} grew across reruns");
    }
}

#[test]
fn max_gap_survived_only_considers_survivors() {
    let output = sample_output();
    let mut conn = fresh_db();
    persist::replace_outputs(&mut conn, &output).expect("persist");

    let record = queries::max_gap_survived(&conn).expect("query").expect("record");
    // Denham's positive gaps are excluded; the worst any survivor sat was
    // level with the safety line.
    assert_eq!(record.points_gap, 0);
    assert_eq!(record.eventually_survived, Some(true));
    assert_ne!(record.team, "Denham");
}
