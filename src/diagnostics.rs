//! Export issues and the outer pass boundary.
//!
//! ## Issue Types
//!
//! | Issue | Severity | Effect |
//! |-------|----------|--------|
//! | MissingFrame | INFO | Occurrence flagged `has_invalid_frames` |
//! | UnresolvedDisplayIndex | WARNING | Occurrence not placed |
//! | PackingOverflow | WARNING | Image left out of every page |
//! | ConversionFailed | WARNING | Shape left out of the spritesheet |
//! | PageExportFailed | ERROR | Page file not written |
//! | PassAborted | ERROR | Pass stopped early |
//!
//! A pass run through [`run_pass`] always produces an [`ExportReport`]; any
//! issue at WARNING or above marks it completed-with-errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::packer::{FailureReason, PackFailure};
use crate::timeline::UnresolvedOccurrence;
use crate::types::{LayerId, ShapeId, SymbolId};

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Expected condition, reported for completeness.
    Info,
    /// Part of the output is missing.
    Warning,
    /// An output file or the whole pass is missing.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Something that went wrong, or was skipped, during an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportIssue {
    /// A symbol layer had no frame at the requested local index.
    MissingFrame {
        /// Symbol whose layers were queried.
        symbol: SymbolId,
        /// Local frame index.
        frame_index: u32,
    },
    /// An instance's display index could not be resolved.
    UnresolvedDisplayIndex {
        /// Layer holding the instance.
        layer: LayerId,
        /// Frame index queried.
        frame_index: u32,
        /// Referenced library item.
        library_item: String,
        /// Raw loop label.
        loop_mode: Option<String>,
    },
    /// A shape has no host-reported bounds and was left out of the layout.
    MissingBounds {
        /// Shape id.
        shape: ShapeId,
    },
    /// An image did not fit on any page.
    PackingOverflow {
        /// Image name.
        name: String,
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
        /// Reason.
        reason: FailureReason,
    },
    /// The host could not convert a shape.
    ConversionFailed {
        /// Shape id.
        shape: ShapeId,
        /// Host message.
        message: String,
    },
    /// The host could not write a page.
    PageExportFailed {
        /// Page file name.
        page: String,
        /// Host message.
        message: String,
    },
    /// The pass returned an error.
    PassAborted {
        /// Error message.
        message: String,
    },
}

impl ExportIssue {
    /// Severity of this issue.
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingFrame { .. } => Severity::Info,
            Self::UnresolvedDisplayIndex { .. } => Severity::Warning,
            Self::MissingBounds { .. } => Severity::Info,
            Self::PackingOverflow { .. } => Severity::Warning,
            Self::ConversionFailed { .. } => Severity::Warning,
            Self::PageExportFailed { .. } => Severity::Error,
            Self::PassAborted { .. } => Severity::Error,
        }
    }

    /// Short name of the issue type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFrame { .. } => "missing_frame",
            Self::UnresolvedDisplayIndex { .. } => "unresolved_display_index",
            Self::MissingBounds { .. } => "missing_bounds",
            Self::PackingOverflow { .. } => "packing_overflow",
            Self::ConversionFailed { .. } => "conversion_failed",
            Self::PageExportFailed { .. } => "page_export_failed",
            Self::PassAborted { .. } => "pass_aborted",
        }
    }
}

impl From<&UnresolvedOccurrence> for ExportIssue {
    fn from(occurrence: &UnresolvedOccurrence) -> Self {
        Self::UnresolvedDisplayIndex {
            layer: occurrence.layer.clone(),
            frame_index: occurrence.frame_index,
            library_item: occurrence.library_item.clone(),
            loop_mode: occurrence.loop_mode.clone(),
        }
    }
}

impl From<PackFailure> for ExportIssue {
    fn from(failure: PackFailure) -> Self {
        Self::PackingOverflow {
            name: failure.name,
            width: failure.width,
            height: failure.height,
            reason: failure.reason,
        }
    }
}

/// Issues collected while a pass runs.
#[derive(Debug, Clone, Default)]
pub struct IssueLog {
    issues: Vec<ExportIssue>,
}

impl IssueLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn record(&mut self, issue: ExportIssue) {
        if issue.severity() >= Severity::Warning {
            tracing::warn!(kind = issue.kind(), severity = %issue.severity(), ?issue, "Export issue");
        } else {
            tracing::debug!(kind = issue.kind(), ?issue, "Export issue");
        }
        self.issues.push(issue);
    }

    /// Record several issues.
    pub fn extend(&mut self, issues: impl IntoIterator<Item = ExportIssue>) {
        for issue in issues {
            self.record(issue);
        }
    }

    /// Recorded issues.
    pub fn issues(&self) -> &[ExportIssue] {
        &self.issues
    }

    /// Consume the log.
    pub fn into_issues(self) -> Vec<ExportIssue> {
        self.issues
    }
}

/// Final status of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    /// No issue at WARNING or above.
    Completed,
    /// At least one issue at WARNING or above.
    CompletedWithErrors,
}

/// Outcome of one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport<T> {
    /// Pass name.
    pub pass: String,
    /// Final status.
    pub status: PassStatus,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// End time.
    pub finished_at: DateTime<Utc>,
    /// Issues in the order they were recorded.
    pub issues: Vec<ExportIssue>,
    /// Pass output, absent when the pass aborted.
    pub output: Option<T>,
}

impl<T> ExportReport<T> {
    /// Count issues at or above `severity`.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() >= severity)
            .count()
    }
}

/// Run `pass`, catching its error at this boundary.
///
/// The pass records issues into the log it is given. An `Err` is logged,
/// recorded as `PassAborted` and leaves the report without output.
pub fn run_pass<T, E, F>(name: &str, pass: F) -> ExportReport<T>
where
    E: std::fmt::Display,
    F: FnOnce(&mut IssueLog) -> Result<T, E>,
{
    let started_at = Utc::now();
    tracing::info!(pass = name, "Pass started");

    let mut log = IssueLog::new();
    let output = match pass(&mut log) {
        Ok(output) => Some(output),
        Err(err) => {
            tracing::error!(pass = name, error = %err, "Pass aborted");
            log.record(ExportIssue::PassAborted {
                message: err.to_string(),
            });
            None
        }
    };

    let issues = log.into_issues();
    let status = if issues.iter().any(|issue| issue.severity() >= Severity::Warning) {
        PassStatus::CompletedWithErrors
    } else {
        PassStatus::Completed
    };
    tracing::info!(pass = name, ?status, issue_count = issues.len(), "Pass completed");

    ExportReport {
        pass: name.to_string(),
        status,
        started_at,
        finished_at: Utc::now(),
        issues,
        output,
    }
}
