//! Diagnostics collected during an audit run.
//!
//! Everything here except [`AuditError`] is recoverable: it is accumulated
//! alongside the stage output and surfaced in the report. `AuditError` means
//! the run could not happen at all.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::model::SourceLocation;

/// A requirement or test item record that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadError {
    /// The file could not be read or decoded.
    #[error("{location}: failed to read record: {message}")]
    Unreadable {
        /// Offending file.
        location: SourceLocation,
        /// Underlying I/O or decoding error.
        message: String,
    },
    /// The file is not a YAML mapping.
    #[error("{location}: failed to parse record: {message}")]
    Unparsable {
        /// Offending file.
        location: SourceLocation,
        /// Parser error or shape mismatch.
        message: String,
    },
    /// A required field is absent or empty.
    #[error("{location}: missing required field `{field}`")]
    MissingField {
        /// Offending file.
        location: SourceLocation,
        /// Field name.
        field: &'static str,
    },
    /// A field is present but has the wrong shape or an invalid identifier.
    #[error("{location}: invalid field `{field}`: {message}")]
    InvalidField {
        /// Offending file.
        location: SourceLocation,
        /// Field name.
        field: &'static str,
        /// What was wrong.
        message: String,
    },
    /// A second record declared an id that is already loaded.
    #[error("duplicate id `{id}` in {second} (first declared in {first})")]
    DuplicateId {
        /// The contested id.
        id: String,
        /// The record that was kept.
        first: SourceLocation,
        /// The record that was rejected.
        second: SourceLocation,
    },
}

/// A test file or annotation block that was skipped during scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// The file could not be read.
    #[error("{location}: failed to read file: {message}")]
    Unreadable {
        /// Offending file.
        location: SourceLocation,
        /// Underlying I/O error.
        message: String,
    },
    /// The file is not valid UTF-8 text.
    #[error("{location}: not valid UTF-8, skipped")]
    Undecodable {
        /// Offending file.
        location: SourceLocation,
    },
    /// A block had recognised markers but invalid structure.
    #[error("{location}: malformed annotation block: {reason}")]
    MalformedBlock {
        /// Span of the skipped block.
        location: SourceLocation,
        /// What was wrong.
        reason: String,
    },
}

impl ScanWarning {
    /// Returns `true` for warnings that only note a skipped non-text file.
    /// These never make a run unclean.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::Undecodable { .. })
    }
}

/// A conflict noticed while merging test nodes into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationWarning {
    /// Two test nodes at different locations declare the same id.
    #[error("duplicate test id `{id}` at {second} (first declared at {first})")]
    DuplicateTestId {
        /// The contested id.
        id: String,
        /// First declaration in discovery order.
        first: SourceLocation,
        /// Later declaration; both nodes are kept.
        second: SourceLocation,
    },
    /// A test node declares the id of a requirement.
    #[error("test id `{id}` at {test} shadows the requirement declared at {requirement}")]
    TestIdShadowsRequirement {
        /// The contested id.
        id: String,
        /// The test node's location.
        test: SourceLocation,
        /// The requirement's location.
        requirement: SourceLocation,
    },
}

/// A condition that prevents the audit from running.
#[derive(Debug, Error)]
pub enum AuditError {
    /// An input root or configured directory does not exist.
    #[error("{label} directory not found: {}", path.display())]
    MissingInput {
        /// Which input this was (e.g. "Requirement").
        label: &'static str,
        /// The resolved path.
        path: PathBuf,
    },
    /// An input directory exists but cannot be listed.
    #[error("failed to read {label} directory {}: {message}", path.display())]
    UnreadableInput {
        /// Which input this was.
        label: &'static str,
        /// The resolved path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The configuration file is missing or invalid.
    #[error("invalid configuration {}: {message}", path.display())]
    Config {
        /// Config file path.
        path: PathBuf,
        /// What was wrong.
        message: String,
    },
    /// An output artifact could not be written.
    #[error("failed to write {}: {message}", path.display())]
    Output {
        /// Artifact path.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },
    /// The report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Recoverable diagnostics from the load and scan stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    /// Requirement and test item load errors.
    pub load_errors: Vec<LoadError>,
    /// Test tree scan warnings.
    pub scan_warnings: Vec<ScanWarning>,
}

impl Diagnostics {
    /// Returns `true` when nothing went wrong while loading or scanning.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.load_errors.is_empty() && self.scan_warnings.is_empty()
    }

    /// Number of diagnostics that make a run unclean.
    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.load_errors.len() + self.scan_warnings.iter().filter(|w| !w.is_informational()).count()
    }

    /// Total number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.load_errors.len() + self.scan_warnings.len()
    }
}
