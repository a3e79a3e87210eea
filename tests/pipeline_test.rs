//! Integration tests for the responses transform pipeline
//!
//! These tests drive the pipeline end to end over in-memory tables,
//! covering the stage interaction rules: left-join row preservation,
//! final-answer selection, metadata projection and user dropping,
//! deduplication, duration columns and the pivot reshape.

use chrono::{TimeZone, Utc};
use porter::core::pipeline::TransformPipeline;
use porter::domain::table::{Cell, TabularDataset};
use porter::domain::{ExportOptions, PorterError};

fn ts(h: u32, m: u32, s: u32) -> Cell {
    Cell::Timestamp(Utc.with_ymd_and_hms(2020, 1, 1, h, m, s).unwrap())
}

fn responses_columns() -> Vec<String> {
    [
        "surveyid",
        "userid",
        "question_ref",
        "response",
        "timestamp",
        "metadata",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn row(
    survey: &str,
    user: &str,
    question: &str,
    response: &str,
    timestamp: Cell,
    metadata: &str,
) -> Vec<Cell> {
    vec![
        survey.into(),
        user.into(),
        question.into(),
        response.into(),
        timestamp,
        metadata.into(),
    ]
}

/// 12 response rows across 3 users and 3 surveys
///
/// Users 1 and 2 carry a stratumid on at least one row; user 3 has none
/// at all.
fn fixture_responses() -> TabularDataset {
    let z = r#"{"stratumid": "Z"}"#;
    let x = r#"{"stratumid": "X"}"#;
    TabularDataset::from_rows(
        responses_columns(),
        vec![
            row("a", "1", "A", "response", ts(12, 2, 0), z),
            row("a", "1", "B", "response", ts(12, 2, 1), z),
            row("a", "1", "C", "response", ts(12, 2, 5), z),
            row("a", "1", "D", "response", ts(12, 2, 10), z),
            row("b", "1", "A", "response", ts(12, 3, 0), z),
            row("b", "1", "B", "response", ts(12, 4, 0), z),
            row("a", "2", "A", "response", ts(12, 2, 0), x),
            row("a", "2", "B", "response", ts(12, 2, 5), x),
            row("c", "2", "C", "response", ts(12, 3, 5), "{}"),
            row("b", "3", "A", "response", ts(12, 2, 5), "{}"),
            row("b", "3", "A", "response2", ts(12, 2, 6), "{}"),
            row("c", "3", "A", "response", ts(12, 2, 5), "{}"),
        ],
    )
    .unwrap()
}

fn fixture_form_data() -> TabularDataset {
    TabularDataset::from_rows(
        [
            "surveyid",
            "shortcode",
            "survey_name",
            "version",
            "survey_created",
            "metadata",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
        vec![
            vec![
                "a".into(),
                "foo".into(),
                "survey-1".into(),
                1i64.into(),
                ts(12, 1, 0),
                r#"{"wave": "0"}"#.into(),
            ],
            vec![
                "b".into(),
                "bar".into(),
                "survey-1".into(),
                1i64.into(),
                ts(12, 1, 0),
                "{}".into(),
            ],
            vec![
                "c".into(),
                "fooz".into(),
                "survey-1".into(),
                1i64.into(),
                ts(12, 1, 0),
                r#"{"wave": "0"}"#.into(),
            ],
        ],
    )
    .unwrap()
}

#[test]
fn join_alone_preserves_every_row_and_prefixes_form_metadata() {
    let pipeline = TransformPipeline::build(&ExportOptions::default()).unwrap();
    let result = pipeline
        .execute(fixture_responses(), &fixture_form_data())
        .unwrap();

    // Left join: every input row appears exactly once
    assert_eq!(result.num_rows(), 12);
    // 6 response columns + shortcode/version/survey_created + form_wave
    assert_eq!(result.num_columns(), 10);
    assert!(result.column_index("form_wave").is_some());
    assert!(result.column_index("shortcode").is_some());
}

#[test]
fn join_keeps_unmatched_responses_with_null_form_columns() {
    let mut responses = fixture_responses();
    responses
        .push_row(row("zzz", "9", "A", "orphan", ts(13, 0, 0), "{}"))
        .unwrap();

    let pipeline = TransformPipeline::build(&ExportOptions::default()).unwrap();
    let result = pipeline.execute(responses, &fixture_form_data()).unwrap();

    assert_eq!(result.num_rows(), 13);
    let shortcode = result.require_column("shortcode").unwrap();
    let last = result.num_rows() - 1;
    assert!(result.cell(last, shortcode).is_null());
}

#[test]
fn drop_users_without_scenario_keeps_only_users_with_the_field() {
    let options = ExportOptions {
        metadata: Some(vec!["stratumid".to_string()]),
        drop_users_without: Some("stratumid".to_string()),
        ..ExportOptions::default()
    };
    let pipeline = TransformPipeline::build(&options).unwrap();
    let result = pipeline
        .execute(fixture_responses(), &fixture_form_data())
        .unwrap();

    // User 3 has no stratumid on any row; users 1 and 2 survive whole
    assert_eq!(result.num_rows(), 9);
    assert!(result.num_rows() < fixture_responses().num_rows());

    let userid = result.require_column("userid").unwrap();
    let mut survivors: Vec<String> = result.rows().iter().map(|r| r[userid].render()).collect();
    survivors.dedup();
    assert_eq!(survivors, vec!["1", "2"]);
}

#[test]
fn keep_final_answer_is_unique_and_maximal_per_group() {
    let options = ExportOptions {
        keep_final_answer: true,
        ..ExportOptions::default()
    };
    let pipeline = TransformPipeline::build(&options).unwrap();
    let result = pipeline
        .execute(fixture_responses(), &fixture_form_data())
        .unwrap();

    let userid = result.require_column("userid").unwrap();
    let question = result.require_column("question_ref").unwrap();
    let timestamp = result.require_column("timestamp").unwrap();

    // At most one row per (user, question reference)
    let mut seen = std::collections::HashSet::new();
    for r in result.rows() {
        assert!(seen.insert((r[userid].render(), r[question].render())));
    }

    // User 3 answered question A three times; the survivor is the latest
    let survivor = result
        .rows()
        .iter()
        .find(|r| r[userid].render() == "3" && r[question].render() == "A")
        .unwrap();
    assert_eq!(
        survivor[timestamp].as_timestamp().unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 1, 12, 2, 6).unwrap()
    );
}

#[test]
fn full_option_chain_pivots_one_row_per_user_and_shortcode() {
    let options = ExportOptions {
        keep_final_answer: true,
        metadata: Some(vec!["stratumid".to_string()]),
        drop_users_without: Some("stratumid".to_string()),
        drop_duplicated_users: true,
        add_duration: true,
        pivot: true,
        response_value: Some("response".to_string()),
    };
    let pipeline = TransformPipeline::build(&options).unwrap();
    let result = pipeline
        .execute(fixture_responses(), &fixture_form_data())
        .unwrap();

    // Users 1 and 2 over shortcodes foo/bar and foo/fooz respectively
    assert_eq!(result.num_rows(), 4);
    assert_eq!(result.columns()[0], "userid");
    assert_eq!(result.columns()[1], "shortcode");

    let userid = 0;
    let shortcode = 1;
    let keys: Vec<(String, String)> = result
        .rows()
        .iter()
        .map(|r| (r[userid].render(), r[shortcode].render()))
        .collect();
    assert!(keys.contains(&("1".to_string(), "foo".to_string())));
    assert!(keys.contains(&("1".to_string(), "bar".to_string())));
    assert!(keys.contains(&("2".to_string(), "foo".to_string())));
    assert!(keys.contains(&("2".to_string(), "fooz".to_string())));
}

#[test]
fn add_duration_spans_first_to_last_response() {
    let options = ExportOptions {
        add_duration: true,
        ..ExportOptions::default()
    };
    let pipeline = TransformPipeline::build(&options).unwrap();
    let result = pipeline
        .execute(fixture_responses(), &fixture_form_data())
        .unwrap();

    // No rows removed
    assert_eq!(result.num_rows(), 12);

    let userid = result.require_column("userid").unwrap();
    let duration = result.require_column("duration_seconds").unwrap();
    let user1 = result
        .rows()
        .iter()
        .find(|r| r[userid].render() == "1")
        .unwrap();
    // User 1 answered from 12:02:00 to 12:04:00
    assert_eq!(user1[duration], Cell::Int(120));
}

#[test]
fn pivot_without_response_value_fails_before_any_stage() {
    let options = ExportOptions {
        pivot: true,
        keep_final_answer: true,
        ..ExportOptions::default()
    };

    let err = TransformPipeline::build(&options).unwrap_err();
    assert!(matches!(err, PorterError::Configuration(_)));
}

#[test]
fn empty_input_flows_through_to_an_empty_artifact() {
    let options = ExportOptions {
        keep_final_answer: true,
        add_duration: true,
        ..ExportOptions::default()
    };
    let pipeline = TransformPipeline::build(&options).unwrap();

    let empty = TabularDataset::new(responses_columns());
    let result = pipeline.execute(empty, &fixture_form_data()).unwrap();

    assert!(result.is_empty());
    // Still a valid artifact: header row only
    let csv = result.to_csv().unwrap();
    assert_eq!(csv.lines().count(), 1);
}
