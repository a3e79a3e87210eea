//! PostgreSQL data source
//!
//! The three read queries behind an export. Every query binds `user` and
//! `survey` as `$n` parameters; request data never reaches the query text.
//! Identifier-ish columns are cast to text so the row decoding contract is
//! independent of the store's column types; timestamps stay timestamps so
//! the pipeline can compare and subtract them.

use crate::adapters::database::client::PostgresClient;
use crate::adapters::database::traits::DataSource;
use crate::domain::request::ChatLogExportOptions;
use crate::domain::table::{Cell, TabularDataset};
use crate::domain::{PorterError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_postgres::Row;

const RESPONSES_QUERY: &str = "
    SELECT responses.parent_surveyid::text,
           responses.parent_shortcode::text,
           responses.surveyid::text,
           responses.flowid::text,
           responses.userid::text,
           responses.question_ref::text,
           responses.question_idx::text,
           responses.question_text::text,
           responses.response::text,
           responses.timestamp::timestamptz,
           responses.metadata::text,
           responses.pageid::text,
           responses.translated_response::text
    FROM responses
    LEFT JOIN surveys ON responses.surveyid = surveys.id
    LEFT JOIN users ON surveys.userid = users.id
    WHERE users.email = $1
      AND surveys.survey_name = $2
    ORDER BY responses.userid, responses.timestamp, responses.question_ref
";

const RESPONSES_COLUMNS: [&str; 13] = [
    "parent_surveyid",
    "parent_shortcode",
    "surveyid",
    "flowid",
    "userid",
    "question_ref",
    "question_idx",
    "question_text",
    "response",
    "timestamp",
    "metadata",
    "pageid",
    "translated_response",
];

const FORM_DATA_QUERY: &str = "
    WITH t AS (
      SELECT surveys.*, row_number() OVER (PARTITION BY shortcode ORDER BY created) AS version
      FROM surveys
      LEFT JOIN users ON surveys.userid = users.id
      WHERE users.email = $1
        AND surveys.survey_name = $2
    )
    SELECT id::text AS surveyid,
           shortcode::text,
           survey_name::text,
           version,
           created::timestamptz AS survey_created,
           metadata::text
    FROM t
    ORDER BY shortcode, created
";

const FORM_DATA_COLUMNS: [&str; 6] = [
    "surveyid",
    "shortcode",
    "survey_name",
    "version",
    "survey_created",
    "metadata",
];

/// Base chat-log columns, present on every chat-log export
const CHAT_LOG_BASE_COLUMNS: [&str; 9] = [
    "userid",
    "pageid",
    "timestamp",
    "direction",
    "content",
    "question_ref",
    "shortcode",
    "surveyid",
    "message_type",
];

/// Output column names of the chat-log query for the given options
pub fn chat_log_columns(options: &ChatLogExportOptions) -> Vec<String> {
    let mut columns: Vec<String> = CHAT_LOG_BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .collect();
    if options.include_metadata {
        columns.push("metadata".to_string());
    }
    if options.include_raw_payload {
        columns.push("raw_payload".to_string());
    }
    columns
}

/// Build the chat-log query text for the given options
///
/// The column list varies only over a fixed set of literal names; `user`
/// and `survey` remain bound parameters.
pub fn chat_log_query(options: &ChatLogExportOptions) -> String {
    let mut select = vec![
        "cl.userid::text AS userid",
        "cl.pageid::text AS pageid",
        "cl.timestamp::timestamptz AS timestamp",
        "cl.direction::text AS direction",
        "cl.content::text AS content",
        "cl.question_ref::text AS question_ref",
        "cl.shortcode::text AS shortcode",
        "s.id::text AS surveyid",
        "cl.message_type::text AS message_type",
    ];
    if options.include_metadata {
        select.push("cl.metadata::text AS metadata");
    }
    if options.include_raw_payload {
        select.push("cl.raw_payload::text AS raw_payload");
    }

    format!(
        "SELECT DISTINCT {}\n    FROM chat_log cl\n    INNER JOIN surveys s ON cl.shortcode = s.shortcode\n    INNER JOIN users u ON s.userid = u.id\n    WHERE u.email = $1\n      AND s.survey_name = $2\n    ORDER BY userid, timestamp",
        select.join(",\n           ")
    )
}

/// PostgreSQL-backed data source
pub struct PostgresDataSource {
    client: Arc<PostgresClient>,
}

impl PostgresDataSource {
    /// Create a new data source over a pooled client
    pub fn new(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for PostgresDataSource {
    async fn fetch_responses(&self, user: &str, survey: &str) -> Result<TabularDataset> {
        let rows = self.client.query(RESPONSES_QUERY, &[&user, &survey]).await?;

        let mut table = TabularDataset::new(
            RESPONSES_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        for row in rows {
            let mut cells = Vec::with_capacity(RESPONSES_COLUMNS.len());
            for (idx, column) in RESPONSES_COLUMNS.iter().enumerate() {
                let cell = if *column == "timestamp" {
                    timestamp_cell(&row, idx)?
                } else {
                    text_cell(&row, idx)?
                };
                cells.push(cell);
            }
            table.push_row(cells)?;
        }
        Ok(table)
    }

    async fn fetch_form_data(&self, user: &str, survey: &str) -> Result<TabularDataset> {
        let rows = self.client.query(FORM_DATA_QUERY, &[&user, &survey]).await?;

        let mut table = TabularDataset::new(
            FORM_DATA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        for row in rows {
            table.push_row(vec![
                text_cell(&row, 0)?,
                text_cell(&row, 1)?,
                text_cell(&row, 2)?,
                int_cell(&row, 3)?,
                timestamp_cell(&row, 4)?,
                text_cell(&row, 5)?,
            ])?;
        }
        Ok(table)
    }

    async fn fetch_chat_log(
        &self,
        user: &str,
        survey: &str,
        options: &ChatLogExportOptions,
    ) -> Result<TabularDataset> {
        let query = chat_log_query(options);
        let columns = chat_log_columns(options);
        let rows = self.client.query(&query, &[&user, &survey]).await?;

        let mut table = TabularDataset::new(columns.clone());
        for row in rows {
            let mut cells = Vec::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                let cell = if column == "timestamp" {
                    timestamp_cell(&row, idx)?
                } else {
                    text_cell(&row, idx)?
                };
                cells.push(cell);
            }
            table.push_row(cells)?;
        }
        Ok(table)
    }
}

fn text_cell(row: &Row, idx: usize) -> Result<Cell> {
    let value: Option<String> = row
        .try_get(idx)
        .map_err(|e| PorterError::Database(format!("Failed to decode column {idx}: {e}")))?;
    Ok(value.into())
}

fn int_cell(row: &Row, idx: usize) -> Result<Cell> {
    let value: Option<i64> = row
        .try_get(idx)
        .map_err(|e| PorterError::Database(format!("Failed to decode column {idx}: {e}")))?;
    Ok(value.map_or(Cell::Null, Cell::Int))
}

fn timestamp_cell(row: &Row, idx: usize) -> Result<Cell> {
    let value: Option<DateTime<Utc>> = row
        .try_get(idx)
        .map_err(|e| PorterError::Database(format!("Failed to decode column {idx}: {e}")))?;
    Ok(value.map_or(Cell::Null, Cell::Timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(false, false, 9 ; "base columns only")]
    #[test_case(true, false, 10 ; "with metadata")]
    #[test_case(false, true, 10 ; "with raw payload")]
    #[test_case(true, true, 11 ; "with both")]
    fn test_chat_log_column_count(
        include_metadata: bool,
        include_raw_payload: bool,
        expected: usize,
    ) {
        let options = ChatLogExportOptions {
            include_metadata,
            include_raw_payload,
        };
        assert_eq!(chat_log_columns(&options).len(), expected);
    }

    #[test]
    fn test_chat_log_base_columns_only() {
        let options = ChatLogExportOptions::default();
        let sql = chat_log_query(&options);

        assert!(!sql.contains("cl.metadata"));
        assert!(!sql.contains("cl.raw_payload"));
        assert_eq!(chat_log_columns(&options).len(), 9);
    }

    #[test]
    fn test_chat_log_includes_metadata_when_enabled() {
        let options = ChatLogExportOptions {
            include_metadata: true,
            include_raw_payload: false,
        };
        let sql = chat_log_query(&options);

        assert!(sql.contains("cl.metadata::text"));
        assert!(!sql.contains("cl.raw_payload"));
        assert_eq!(chat_log_columns(&options).len(), 10);
    }

    #[test]
    fn test_chat_log_includes_raw_payload_when_enabled() {
        let options = ChatLogExportOptions {
            include_metadata: false,
            include_raw_payload: true,
        };
        let sql = chat_log_query(&options);

        assert!(sql.contains("cl.raw_payload::text"));
        assert!(!sql.contains("cl.metadata"));
        assert_eq!(chat_log_columns(&options).len(), 10);
    }

    #[test]
    fn test_chat_log_includes_both_optional_columns() {
        let options = ChatLogExportOptions {
            include_metadata: true,
            include_raw_payload: true,
        };
        let sql = chat_log_query(&options);

        assert!(sql.contains("cl.metadata::text"));
        assert!(sql.contains("cl.raw_payload::text"));
        assert_eq!(
            chat_log_columns(&options),
            vec![
                "userid",
                "pageid",
                "timestamp",
                "direction",
                "content",
                "question_ref",
                "shortcode",
                "surveyid",
                "message_type",
                "metadata",
                "raw_payload",
            ]
        );
    }

    #[test]
    fn test_chat_log_joins_through_surveys_and_users() {
        let sql = chat_log_query(&ChatLogExportOptions::default());

        assert!(sql.contains("INNER JOIN surveys s ON cl.shortcode = s.shortcode"));
        assert!(sql.contains("INNER JOIN users u ON s.userid = u.id"));
        assert!(sql.contains("u.email = $1"));
        assert!(sql.contains("s.survey_name = $2"));
    }

    #[test]
    fn test_chat_log_rows_are_distinct_and_ordered() {
        let sql = chat_log_query(&ChatLogExportOptions::default());

        assert!(sql.contains("SELECT DISTINCT"));
        assert!(sql.contains("ORDER BY userid, timestamp"));
    }

    #[test]
    fn test_all_queries_bind_parameters() {
        for sql in [
            RESPONSES_QUERY.to_string(),
            FORM_DATA_QUERY.to_string(),
            chat_log_query(&ChatLogExportOptions::default()),
        ] {
            assert!(sql.contains("$1"));
            assert!(sql.contains("$2"));
        }
    }
}
