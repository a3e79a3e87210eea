//! Transform pipeline for the responses export
//!
//! Options select stages; the stage order is a fixed constant of this
//! module, independent of the order options were supplied. The plan is a
//! tagged list of stage descriptors evaluated by one ordered dispatcher,
//! so the composed sequence is directly inspectable and testable.
//!
//! Validation happens at build time, before any stage executes: a pivot
//! without its value column is a configuration error raised with zero
//! database or storage side effects.

pub mod stages;

use crate::domain::request::ExportOptions;
use crate::domain::table::TabularDataset;
use crate::domain::{PorterError, Result};

/// One stage descriptor, in fixed execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Left-join form metadata onto every response row (always first)
    JoinFormData,
    /// Retain the last response per (user, question reference)
    KeepFinalAnswer,
    /// Project named metadata fields into columns
    ProjectMetadata(Vec<String>),
    /// Drop users lacking any non-null value for the field
    DropUsersWithout(String),
    /// Collapse to one row per (user, shortcode)
    DropDuplicatedUsers,
    /// Append per-user elapsed-time columns
    AddDuration,
    /// Reshape long to wide, cells from the value column
    Pivot { response_value: String },
}

/// Ordered, validated stage plan for one responses export
pub struct TransformPipeline {
    stages: Vec<Stage>,
}

impl TransformPipeline {
    /// Validate options and build the stage plan
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `pivot` is requested without
    /// `response_value`.
    pub fn build(options: &ExportOptions) -> Result<Self> {
        let pivot_value = match (options.pivot, &options.response_value) {
            (true, None) => {
                return Err(PorterError::Configuration(
                    "pivot requires response_value to be set".to_string(),
                ))
            }
            (true, Some(value)) => Some(value.clone()),
            (false, _) => None,
        };

        let mut stages = vec![Stage::JoinFormData];
        if options.keep_final_answer {
            stages.push(Stage::KeepFinalAnswer);
        }
        if let Some(fields) = &options.metadata {
            stages.push(Stage::ProjectMetadata(fields.clone()));
        }
        if let Some(field) = &options.drop_users_without {
            stages.push(Stage::DropUsersWithout(field.clone()));
        }
        if options.drop_duplicated_users {
            stages.push(Stage::DropDuplicatedUsers);
        }
        if options.add_duration {
            stages.push(Stage::AddDuration);
        }
        if let Some(response_value) = pivot_value {
            stages.push(Stage::Pivot { response_value });
        }

        Ok(Self { stages })
    }

    /// The composed stage sequence
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the plan over the fetched responses and form data
    ///
    /// Each stage consumes the previous stage's output and produces a new
    /// table; the pipeline is a straight-line composition.
    ///
    /// # Errors
    ///
    /// Returns the first stage error encountered.
    pub fn execute(
        &self,
        responses: TabularDataset,
        form_data: &TabularDataset,
    ) -> Result<TabularDataset> {
        let mut table = responses;
        for stage in &self.stages {
            table = match stage {
                Stage::JoinFormData => stages::join_form_data(&table, form_data)?,
                Stage::KeepFinalAnswer => stages::keep_final_answer(&table)?,
                Stage::ProjectMetadata(fields) => stages::project_metadata(&table, fields)?,
                Stage::DropUsersWithout(field) => stages::drop_users_without(&table, field)?,
                Stage::DropDuplicatedUsers => stages::drop_duplicated_users(&table)?,
                Stage::AddDuration => stages::add_duration(&table)?,
                Stage::Pivot { response_value } => stages::pivot(&table, response_value)?,
            };
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_without_response_value_fails_at_build() {
        let options = ExportOptions {
            pivot: true,
            ..ExportOptions::default()
        };

        let err = TransformPipeline::build(&options).unwrap_err();
        assert!(matches!(err, PorterError::Configuration(_)));
    }

    #[test]
    fn test_default_options_join_only() {
        let pipeline = TransformPipeline::build(&ExportOptions::default()).unwrap();
        assert_eq!(pipeline.stages(), &[Stage::JoinFormData]);
    }

    #[test]
    fn test_stage_order_is_fixed() {
        // Options supplied "backwards" still produce the canonical order
        let options = ExportOptions {
            pivot: true,
            response_value: Some("response".to_string()),
            add_duration: true,
            drop_duplicated_users: true,
            drop_users_without: Some("stratumid".to_string()),
            metadata: Some(vec!["stratumid".to_string()]),
            keep_final_answer: true,
        };

        let pipeline = TransformPipeline::build(&options).unwrap();
        assert_eq!(
            pipeline.stages(),
            &[
                Stage::JoinFormData,
                Stage::KeepFinalAnswer,
                Stage::ProjectMetadata(vec!["stratumid".to_string()]),
                Stage::DropUsersWithout("stratumid".to_string()),
                Stage::DropDuplicatedUsers,
                Stage::AddDuration,
                Stage::Pivot {
                    response_value: "response".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_response_value_without_pivot_adds_no_stage() {
        let options = ExportOptions {
            response_value: Some("response".to_string()),
            ..ExportOptions::default()
        };

        let pipeline = TransformPipeline::build(&options).unwrap();
        assert_eq!(pipeline.stages(), &[Stage::JoinFormData]);
    }
}
