//! Export status lifecycle
//!
//! The externally visible state of one export request. The row itself is
//! created by an upstream collaborator; the worker only moves it through
//! `Started` into exactly one terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one export request
///
/// Transitions: `Started` → `Finished` or `Failed`. A redelivered request
/// resets the row to `Started` and resolves to a terminal state again,
/// so every update is an idempotent overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportStatus {
    /// Processing has begun; no artifact yet
    Started,
    /// Artifact written and link resolved
    Finished,
    /// Processing failed; no link
    Failed,
}

impl ExportStatus {
    /// Wire/database representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Started => "Started",
            ExportStatus::Finished => "Finished",
            ExportStatus::Failed => "Failed",
        }
    }

    /// Whether no further transition follows this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Finished | ExportStatus::Failed)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(ExportStatus::Started.as_str(), "Started");
        assert_eq!(ExportStatus::Finished.as_str(), "Finished");
        assert_eq!(ExportStatus::Failed.as_str(), "Failed");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ExportStatus::Started.is_terminal());
        assert!(ExportStatus::Finished.is_terminal());
        assert!(ExportStatus::Failed.is_terminal());
    }
}
