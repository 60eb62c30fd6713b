//! Annotation Scanner.
//!
//! Walks test sources as plain text and extracts requirement-linkage
//! annotations. Files are only ever read, never executed or imported.
//!
//! Each supported annotation dialect is one [`Dialect`] variant with a block
//! detector and a block parser; the scan loop tries the enabled dialects in
//! order at every line and hands the block to the first that claims it.

mod comment;
mod docstring;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::ServiceContext;
use crate::diagnostics::{AuditError, ScanWarning};
use crate::model::{
    derive_test_id, AnnotationSource, SourceLocation, TestAnnotationNode, TestReference,
};

/// A supported annotation dialect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Contiguous `<PREFIX>-<KEY>: value` comment lines.
    StructuredComment,
    /// A labelled, indented requirement list inside a documentation block.
    DocstringBlock,
}

impl Dialect {
    /// Every dialect, in detection order.
    pub const ALL: [Self; 2] = [Self::StructuredComment, Self::DocstringBlock];

    fn opens_block(self, line: &str, options: &ScanOptions) -> bool {
        match self {
            Self::StructuredComment => comment::is_marker(line, &options.marker_prefix),
            Self::DocstringBlock => docstring::is_header(line, &options.docstring_labels),
        }
    }

    fn parse_block(
        self,
        lines: &[&str],
        start: usize,
        label: &str,
        options: &ScanOptions,
    ) -> ParsedBlock {
        match self {
            Self::StructuredComment => comment::parse_block(lines, start, &options.marker_prefix),
            Self::DocstringBlock => docstring::parse_block(lines, start, label),
        }
    }

    fn source(self) -> AnnotationSource {
        match self {
            Self::StructuredComment => AnnotationSource::StructuredComment,
            Self::DocstringBlock => AnnotationSource::DocstringBlock,
        }
    }
}

/// Scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Enabled dialects, tried in this order at each line.
    pub dialects: Vec<Dialect>,
    /// Marker prefix for the structured-comment dialect (e.g. `HODOR`).
    pub marker_prefix: String,
    /// Section labels that open a docstring block (e.g. `Requirements:`).
    pub docstring_labels: Vec<String>,
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
}

/// Annotations in file-then-line order, plus skipped files and blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Discovered test nodes.
    pub annotations: Vec<TestAnnotationNode>,
    /// Files and blocks that were skipped.
    pub warnings: Vec<ScanWarning>,
}

impl ScanOutcome {
    fn extend(&mut self, other: Self) {
        self.annotations.extend(other.annotations);
        self.warnings.extend(other.warnings);
    }
}

/// Fields a dialect parser extracted from one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BlockFields {
    pub explicit_id: Option<String>,
    pub requirement_refs: Vec<String>,
    pub description: Option<String>,
    pub references: Vec<TestReference>,
}

/// A block claimed by a dialect: lines `start..end` plus its fields, or the
/// reason it is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedBlock {
    pub end: usize,
    pub fields: Result<BlockFields, String>,
}

/// Scans every file under `dirs` (resolved against `root`).
///
/// # Errors
///
/// Returns an error only when a directory is missing or cannot be listed.
pub fn scan_tree(
    ctx: &ServiceContext,
    root: &Path,
    dirs: &[PathBuf],
    options: &ScanOptions,
) -> Result<ScanOutcome, AuditError> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for dir in dirs {
        let dir_path = root.join(dir);
        if !ctx.fs.is_dir(&dir_path) {
            return Err(AuditError::MissingInput { label: "Test scan", path: dir_path });
        }
        let found = ctx.fs.walk_files(&dir_path, &options.skip_dirs).map_err(|e| {
            AuditError::UnreadableInput {
                label: "Test scan",
                path: dir_path.clone(),
                message: e.to_string(),
            }
        })?;
        // Overlapping scan dirs must not produce the same block twice.
        files.extend(found.into_iter().filter(|path| seen.insert(path.clone())));
    }
    Ok(scan_files(ctx, root, &files, options))
}

/// Scans an explicit list of files, preserving the list's order.
#[must_use]
pub fn scan_files(
    ctx: &ServiceContext,
    root: &Path,
    files: &[PathBuf],
    options: &ScanOptions,
) -> ScanOutcome {
    let per_file: Vec<ScanOutcome> =
        files.par_iter().map(|path| scan_file(ctx, root, path, options)).collect();

    let mut outcome = ScanOutcome::default();
    for file in per_file {
        outcome.extend(file);
    }
    info!(
        files = files.len(),
        annotations = outcome.annotations.len(),
        warnings = outcome.warnings.len(),
        "test tree scanned"
    );
    outcome
}

fn scan_file(ctx: &ServiceContext, root: &Path, path: &Path, options: &ScanOptions) -> ScanOutcome {
    let label = SourceLocation::relative_label(root, path);
    let bytes = match ctx.fs.read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return ScanOutcome {
                annotations: Vec::new(),
                warnings: vec![ScanWarning::Unreadable {
                    location: SourceLocation::file(label),
                    message: e.to_string(),
                }],
            }
        }
    };
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let Ok(text) = std::str::from_utf8(bytes) else {
        debug!(path = %label, "skipping undecodable file");
        return ScanOutcome {
            annotations: Vec::new(),
            warnings: vec![ScanWarning::Undecodable { location: SourceLocation::file(label) }],
        };
    };

    let outcome = scan_text(text, &label, options);
    if !outcome.annotations.is_empty() || !outcome.warnings.is_empty() {
        debug!(
            path = %label,
            blocks = outcome.annotations.len(),
            malformed = outcome.warnings.len(),
            "annotations found"
        );
    }
    outcome
}

/// Extracts every annotation block from one file's text.
///
/// `label` is the file's root-relative path; it scopes derived ids.
#[must_use]
pub fn scan_text(text: &str, label: &str, options: &ScanOptions) -> ScanOutcome {
    let lines: Vec<&str> = text.lines().collect();
    let mut outcome = ScanOutcome::default();

    let mut index = 0;
    while index < lines.len() {
        let Some(dialect) =
            options.dialects.iter().copied().find(|d| d.opens_block(lines[index], options))
        else {
            index += 1;
            continue;
        };

        let block = dialect.parse_block(&lines, index, label, options);
        let end = block.end.max(index + 1);
        let location = SourceLocation::span(label, index + 1, end);
        match block.fields {
            Ok(fields) => outcome.annotations.push(TestAnnotationNode {
                id: fields.explicit_id.unwrap_or_else(|| derive_test_id(&location)),
                requirement_refs: fields.requirement_refs,
                description: fields.description,
                references: fields.references,
                source: dialect.source(),
                location,
            }),
            Err(reason) => outcome.warnings.push(ScanWarning::MalformedBlock { location, reason }),
        }
        index = end;
    }
    outcome
}

/// A line split into indentation, comment leader, and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LeaderSplit<'a> {
    /// Comment leader (`//`, `///`, `#`, `--`, `;`, `/*`, `*`), or empty.
    pub leader: &'a str,
    /// Byte column where the body starts.
    pub column: usize,
    /// Text after the leader, trimmed on both sides.
    pub body: &'a str,
}

/// Splits off leading whitespace and a comment leader.
pub(crate) fn split_leader(line: &str) -> LeaderSplit<'_> {
    let indent = line.len() - line.trim_start().len();
    let rest = &line[indent..];
    let leader_len = leader_len(rest);
    let body = rest[leader_len..].trim_start();
    LeaderSplit {
        leader: &rest[..leader_len],
        column: line.len() - body.len(),
        body: body.trim_end(),
    }
}

fn leader_len(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    let run =
        |from: usize, set: &[u8]| bytes[from..].iter().take_while(|b| set.contains(b)).count();
    if rest.starts_with("//") {
        2 + run(2, b"/!")
    } else if rest.starts_with("/*") {
        2 + run(2, b"*!")
    } else if rest.starts_with("--") {
        2
    } else {
        match bytes.first() {
            Some(&first @ (b'#' | b';' | b'*')) => run(0, &[first]),
            _ => 0,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_options() -> ScanOptions {
    ScanOptions {
        dialects: Dialect::ALL.to_vec(),
        marker_prefix: "HODOR".to_string(),
        docstring_labels: vec!["Requirements:".to_string()],
        skip_dirs: vec!["__pycache__".to_string()],
    }
}
