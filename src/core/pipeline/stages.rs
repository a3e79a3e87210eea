//! Transform stages
//!
//! The seven table transforms the responses pipeline composes. Each is a
//! pure function: it consumes one table (plus, for the join, the form
//! table) and produces a new one, never mutating its input.

use crate::domain::table::{Cell, TabularDataset};
use crate::domain::{PorterError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

const USERID: &str = "userid";
const SURVEYID: &str = "surveyid";
const QUESTION_REF: &str = "question_ref";
const TIMESTAMP: &str = "timestamp";
const METADATA: &str = "metadata";
const SHORTCODE: &str = "shortcode";

/// Prefix for columns derived from the form metadata blob
///
/// Only the metadata-derived names can collide with response columns;
/// the fixed form columns (shortcode, version, survey_created) cannot.
const FORM_PREFIX: &str = "form_";

/// Left-join every response row to its survey's form metadata
///
/// Injects `shortcode`, `version` and `survey_created` from the matching
/// form row, plus one `form_`-prefixed column per key appearing in any
/// form metadata blob. Unmatched responses keep null form columns.
pub fn join_form_data(
    responses: &TabularDataset,
    form_data: &TabularDataset,
) -> Result<TabularDataset> {
    let resp_surveyid = responses.require_column(SURVEYID)?;
    let form_surveyid = form_data.require_column(SURVEYID)?;
    let form_shortcode = form_data.require_column(SHORTCODE)?;
    let form_version = form_data.require_column("version")?;
    let form_created = form_data.require_column("survey_created")?;
    let form_metadata = form_data.require_column(METADATA)?;

    // Parse each form row's metadata blob once, collecting the key union
    let mut parsed: Vec<Option<serde_json::Map<String, serde_json::Value>>> = Vec::new();
    let mut keys: Vec<String> = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    for row in form_data.rows() {
        let object = parse_metadata_blob(&row[form_metadata])?;
        if let Some(object) = &object {
            for key in object.keys() {
                if seen_keys.insert(key.clone()) {
                    keys.push(key.clone());
                }
            }
        }
        parsed.push(object);
    }
    keys.sort();

    // First form row per survey id wins; ids are unique in practice
    let mut by_surveyid: HashMap<String, usize> = HashMap::new();
    for (idx, row) in form_data.rows().iter().enumerate() {
        if let Some(id) = row[form_surveyid].as_text() {
            by_surveyid.entry(id.to_string()).or_insert(idx);
        }
    }

    let mut columns = responses.columns().to_vec();
    columns.push(SHORTCODE.to_string());
    columns.push("version".to_string());
    columns.push("survey_created".to_string());
    for key in &keys {
        columns.push(format!("{FORM_PREFIX}{key}"));
    }

    let mut joined = TabularDataset::new(columns);
    for row in responses.rows() {
        let mut cells = row.clone();
        let matched = row[resp_surveyid]
            .as_text()
            .and_then(|id| by_surveyid.get(id));
        match matched {
            Some(&form_idx) => {
                let form_row = &form_data.rows()[form_idx];
                cells.push(form_row[form_shortcode].clone());
                cells.push(form_row[form_version].clone());
                cells.push(form_row[form_created].clone());
                for key in &keys {
                    let value = parsed[form_idx]
                        .as_ref()
                        .and_then(|object| object.get(key))
                        .map_or(Cell::Null, json_to_cell);
                    cells.push(value);
                }
            }
            None => {
                for _ in 0..3 + keys.len() {
                    cells.push(Cell::Null);
                }
            }
        }
        joined.push_row(cells)?;
    }
    Ok(joined)
}

/// Retain only the last response per (user, question reference)
///
/// The surviving row carries the maximum timestamp of its group; ties
/// resolve to the later row in the input order. Surviving rows keep their
/// relative input order.
pub fn keep_final_answer(table: &TabularDataset) -> Result<TabularDataset> {
    let userid = table.require_column(USERID)?;
    let question_ref = table.require_column(QUESTION_REF)?;
    let timestamp = table.require_column(TIMESTAMP)?;

    let mut winners: HashMap<(String, String), (usize, DateTime<Utc>)> = HashMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        let key = (row[userid].render(), row[question_ref].render());
        let ts = row[timestamp]
            .as_timestamp()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        match winners.get(&key) {
            Some((_, best)) if ts < *best => {}
            _ => {
                winners.insert(key, (idx, ts));
            }
        }
    }

    let keep: HashSet<usize> = winners.values().map(|(idx, _)| *idx).collect();
    let mut result = TabularDataset::new(table.columns().to_vec());
    for (idx, row) in table.rows().iter().enumerate() {
        if keep.contains(&idx) {
            result.push_row(row.clone())?;
        }
    }
    Ok(result)
}

/// Project named fields out of each response's metadata blob
///
/// Fields missing from a blob resolve to null. A field whose name already
/// exists as a column overwrites that column, matching what projecting
/// onto an existing frame does.
pub fn project_metadata(table: &TabularDataset, fields: &[String]) -> Result<TabularDataset> {
    let metadata = table.require_column(METADATA)?;

    let mut columns = table.columns().to_vec();
    // Resolve each field to an existing column or a fresh appended one
    let mut targets: Vec<usize> = Vec::with_capacity(fields.len());
    for field in fields {
        match columns.iter().position(|c| c == field) {
            Some(idx) => targets.push(idx),
            None => {
                columns.push(field.clone());
                targets.push(columns.len() - 1);
            }
        }
    }

    let mut result = TabularDataset::new(columns.clone());
    for row in table.rows() {
        let object = parse_metadata_blob(&row[metadata])?;
        let mut cells = row.clone();
        cells.resize(columns.len(), Cell::Null);
        for (field, target) in fields.iter().zip(&targets) {
            cells[*target] = object
                .as_ref()
                .and_then(|object| object.get(field))
                .map_or(Cell::Null, json_to_cell);
        }
        result.push_row(cells)?;
    }
    Ok(result)
}

/// Drop every row of a user that has no non-null value for `field`
pub fn drop_users_without(table: &TabularDataset, field: &str) -> Result<TabularDataset> {
    let userid = table.require_column(USERID)?;
    let target = table.require_column(field)?;

    let mut users_with_value: HashSet<String> = HashSet::new();
    for row in table.rows() {
        if !row[target].is_null() {
            users_with_value.insert(row[userid].render());
        }
    }

    let mut result = TabularDataset::new(table.columns().to_vec());
    for row in table.rows() {
        if users_with_value.contains(&row[userid].render()) {
            result.push_row(row.clone())?;
        }
    }
    Ok(result)
}

/// Collapse to one row per (user, shortcode), first occurrence wins
pub fn drop_duplicated_users(table: &TabularDataset) -> Result<TabularDataset> {
    let userid = table.require_column(USERID)?;
    let shortcode = table.require_column(SHORTCODE)?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut result = TabularDataset::new(table.columns().to_vec());
    for row in table.rows() {
        let key = (row[userid].render(), row[shortcode].render());
        if seen.insert(key) {
            result.push_row(row.clone())?;
        }
    }
    Ok(result)
}

/// Append per-user elapsed-time columns
///
/// Adds `first_response_at`, `last_response_at` and `duration_seconds`,
/// computed from each user's earliest and latest response timestamps.
/// Removes no rows; users without any timestamp get null durations.
pub fn add_duration(table: &TabularDataset) -> Result<TabularDataset> {
    let userid = table.require_column(USERID)?;
    let timestamp = table.require_column(TIMESTAMP)?;

    let mut spans: HashMap<String, (DateTime<Utc>, DateTime<Utc>)> = HashMap::new();
    for row in table.rows() {
        if let Some(ts) = row[timestamp].as_timestamp() {
            spans
                .entry(row[userid].render())
                .and_modify(|(first, last)| {
                    if ts < *first {
                        *first = ts;
                    }
                    if ts > *last {
                        *last = ts;
                    }
                })
                .or_insert((ts, ts));
        }
    }

    let mut columns = table.columns().to_vec();
    columns.push("first_response_at".to_string());
    columns.push("last_response_at".to_string());
    columns.push("duration_seconds".to_string());

    let mut result = TabularDataset::new(columns);
    for row in table.rows() {
        let mut cells = row.clone();
        match spans.get(&row[userid].render()) {
            Some((first, last)) => {
                cells.push(Cell::Timestamp(*first));
                cells.push(Cell::Timestamp(*last));
                cells.push(Cell::Int((*last - *first).num_seconds()));
            }
            None => {
                cells.push(Cell::Null);
                cells.push(Cell::Null);
                cells.push(Cell::Null);
            }
        }
        result.push_row(cells)?;
    }
    Ok(result)
}

/// Reshape long to wide: one row per (user, shortcode), one column per
/// question reference
///
/// Cells come from the named value column. Groups and question columns
/// appear in first-seen order; a duplicate (user, shortcode, question)
/// key overwrites, which is only reachable without `keep_final_answer`.
pub fn pivot(table: &TabularDataset, response_value: &str) -> Result<TabularDataset> {
    let userid = table.require_column(USERID)?;
    let shortcode = table.require_column(SHORTCODE)?;
    let question_ref = table.require_column(QUESTION_REF)?;
    let value = table.require_column(response_value)?;

    let mut group_order: Vec<(String, String)> = Vec::new();
    let mut group_index: HashMap<(String, String), usize> = HashMap::new();
    let mut group_cells: Vec<HashMap<String, Cell>> = Vec::new();
    let mut questions: Vec<String> = Vec::new();
    let mut seen_questions: HashSet<String> = HashSet::new();

    for row in table.rows() {
        let key = (row[userid].render(), row[shortcode].render());
        let group = match group_index.get(&key) {
            Some(idx) => *idx,
            None => {
                group_order.push(key.clone());
                group_index.insert(key, group_order.len() - 1);
                group_cells.push(HashMap::new());
                group_order.len() - 1
            }
        };

        let question = row[question_ref].render();
        if seen_questions.insert(question.clone()) {
            questions.push(question.clone());
        }
        group_cells[group].insert(question, row[value].clone());
    }

    let mut columns = vec![USERID.to_string(), SHORTCODE.to_string()];
    columns.extend(questions.iter().cloned());

    let mut result = TabularDataset::new(columns);
    for (group, (user, code)) in group_order.iter().enumerate() {
        let mut cells = vec![Cell::Text(user.clone()), Cell::Text(code.clone())];
        for question in &questions {
            cells.push(group_cells[group].get(question).cloned().unwrap_or(Cell::Null));
        }
        result.push_row(cells)?;
    }
    Ok(result)
}

/// Parse a metadata blob cell into a JSON object
///
/// Null and blank cells parse as "no metadata"; anything else must be a
/// JSON object.
fn parse_metadata_blob(
    cell: &Cell,
) -> Result<Option<serde_json::Map<String, serde_json::Value>>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Text(s) if s.trim().is_empty() => Ok(None),
        Cell::Text(s) => match serde_json::from_str::<serde_json::Value>(s) {
            Ok(serde_json::Value::Object(object)) => Ok(Some(object)),
            Ok(_) => Err(PorterError::Transform(format!(
                "metadata blob is not a JSON object: {s}"
            ))),
            Err(e) => Err(PorterError::Transform(format!(
                "malformed metadata blob: {e}"
            ))),
        },
        other => Err(PorterError::Transform(format!(
            "metadata blob is not text: {}",
            other.render()
        ))),
    }
}

fn json_to_cell(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Null,
        serde_json::Value::Bool(b) => Cell::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => Cell::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
