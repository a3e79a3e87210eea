//! Inbound export request model
//!
//! One message on the export topic describes one unit of work. The payload
//! is JSON; `export_id`, `survey` and `user` are required, everything else
//! carries a default. An unrecognized `source` is a parse failure, never a
//! silent fallback.

use crate::domain::errors::PorterError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};

/// Which dataset an export request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportSource {
    /// Survey responses joined with form data, run through the transform pipeline
    #[default]
    Responses,
    /// Raw chat log, exported as fetched
    ChatLog,
}

/// Transform configuration for `source = "responses"`
///
/// Each flag or field enables one pipeline stage; the stage order is fixed
/// (see the pipeline module) and independent of the order options appear
/// in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Retain only the last response per (user, question reference)
    pub keep_final_answer: bool,

    /// Metadata fields to project into their own columns
    pub metadata: Option<Vec<String>>,

    /// Drop every row of a user that has no non-null value for this field
    pub drop_users_without: Option<String>,

    /// Collapse to one row per (user, shortcode), first occurrence wins
    pub drop_duplicated_users: bool,

    /// Append first/last response timestamps and elapsed seconds per user
    pub add_duration: bool,

    /// Reshape long to wide: one row per respondent, one column per question
    pub pivot: bool,

    /// Column that populates the pivoted cells; required when `pivot` is set
    pub response_value: Option<String>,
}

/// Column configuration for `source = "chat_log"`
///
/// Purely additive: each flag appends columns at the query level, with no
/// dependency between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatLogExportOptions {
    /// Append the per-message metadata column
    pub include_metadata: bool,

    /// Append the raw payload column
    pub include_raw_payload: bool,
}

/// One export request, as delivered on the export topic
///
/// Created by an upstream producer and consumed exactly once per delivery
/// attempt; the worker never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Producer-side event name; logged, never dispatched on
    #[serde(default)]
    pub event: String,

    /// Survey name scoping the export
    pub survey: String,

    /// Identity used to scope data access
    pub user: String,

    /// Opaque, externally generated, unique identifier of this export
    pub export_id: String,

    /// Which dataset to export
    #[serde(default)]
    pub source: ExportSource,

    /// Transform configuration for the responses pipeline
    #[serde(default)]
    pub options: ExportOptions,

    /// Column configuration for the chat-log pipeline
    #[serde(default)]
    pub chat_log_options: ChatLogExportOptions,
}

impl ExportRequest {
    /// Parse a request from a raw message payload
    ///
    /// # Errors
    ///
    /// Returns `PorterError::Parse` if the payload is not valid JSON, a
    /// required field is missing or empty, or `source` holds an
    /// unrecognized value.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let request: ExportRequest = serde_json::from_slice(payload)
            .map_err(|e| PorterError::Parse(format!("invalid export request payload: {e}")))?;

        if request.export_id.trim().is_empty() {
            return Err(PorterError::Parse("export_id must not be empty".to_string()));
        }
        if request.survey.trim().is_empty() {
            return Err(PorterError::Parse("survey must not be empty".to_string()));
        }
        if request.user.trim().is_empty() {
            return Err(PorterError::Parse("user must not be empty".to_string()));
        }

        Ok(request)
    }

    /// Backend-resolved artifact path for this request
    pub fn artifact_path(&self) -> String {
        match self.source {
            ExportSource::Responses => format!("exports/{}.csv", self.survey),
            ExportSource::ChatLog => format!("exports/{}_chat_log.csv", self.survey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_payload_defaults() {
        let payload = br#"{
            "event": "data-export",
            "survey": "my-survey",
            "user": "user@example.com",
            "export_id": "abc-123"
        }"#;

        let request = ExportRequest::from_payload(payload).unwrap();
        assert_eq!(request.source, ExportSource::Responses);
        assert_eq!(request.options, ExportOptions::default());
        assert_eq!(request.chat_log_options, ChatLogExportOptions::default());
        assert_eq!(request.artifact_path(), "exports/my-survey.csv");
    }

    #[test]
    fn test_parse_chat_log_payload() {
        let payload = br#"{
            "event": "data-export",
            "survey": "my-survey",
            "user": "user@example.com",
            "export_id": "def-456",
            "source": "chat_log",
            "chat_log_options": {"include_raw_payload": true}
        }"#;

        let request = ExportRequest::from_payload(payload).unwrap();
        assert_eq!(request.source, ExportSource::ChatLog);
        assert!(request.chat_log_options.include_raw_payload);
        assert!(!request.chat_log_options.include_metadata);
        assert_eq!(request.artifact_path(), "exports/my-survey_chat_log.csv");
    }

    #[test]
    fn test_missing_export_id_is_parse_error() {
        let payload = br#"{"event": "data-export", "survey": "s", "user": "u"}"#;
        let err = ExportRequest::from_payload(payload).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_empty_export_id_is_parse_error() {
        let payload = br#"{"survey": "s", "user": "u", "export_id": "  "}"#;
        let err = ExportRequest::from_payload(payload).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_unknown_source_is_parse_error() {
        let payload = br#"{"survey": "s", "user": "u", "export_id": "x", "source": "dashboard"}"#;
        let err = ExportRequest::from_payload(payload).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ExportRequest::from_payload(b"not json").unwrap_err();
        assert!(err.is_parse_error());
    }
}
