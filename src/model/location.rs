//! Source locations for report navigation.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// A file path (relative to the audit root) plus an optional line span.
///
/// Ordering is path first, then start line, which is the discovery order the
/// graph is sorted by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path with `/` separators, relative to the audit root when possible.
    pub path: String,
    /// First line (1-based), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Last line (1-based, inclusive) for multi-line blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

impl SourceLocation {
    /// A whole-file location.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), line: None, end_line: None }
    }

    /// A single-line location.
    #[must_use]
    pub fn at(path: impl Into<String>, line: usize) -> Self {
        Self { path: path.into(), line: Some(line), end_line: None }
    }

    /// A line span. Collapses to a single line when `start == end`.
    #[must_use]
    pub fn span(path: impl Into<String>, start: usize, end: usize) -> Self {
        let end_line = (end > start).then_some(end);
        Self { path: path.into(), line: Some(start), end_line }
    }

    /// Builds the display label for `path` relative to `root`.
    ///
    /// Falls back to the full path when `path` is not under `root`.
    #[must_use]
    pub fn relative_label(root: &Path, path: &Path) -> String {
        let rel = path.strip_prefix(root).unwrap_or(path);
        rel.to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.end_line) {
            (Some(start), Some(end)) => write!(f, "{}:{start}-{end}", self.path),
            (Some(start), None) => write!(f, "{}:{start}", self.path),
            _ => f.write_str(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_spans() {
        assert_eq!(SourceLocation::file("reqs/a.yml").to_string(), "reqs/a.yml");
        assert_eq!(SourceLocation::at("t.py", 4).to_string(), "t.py:4");
        assert_eq!(SourceLocation::span("t.py", 4, 6).to_string(), "t.py:4-6");
        assert_eq!(SourceLocation::span("t.py", 4, 4).to_string(), "t.py:4");
    }

    #[test]
    fn orders_by_path_then_line() {
        let mut locs = vec![
            SourceLocation::at("b.py", 1),
            SourceLocation::at("a.py", 10),
            SourceLocation::at("a.py", 2),
        ];
        locs.sort();
        let labels: Vec<String> = locs.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["a.py:2", "a.py:10", "b.py:1"]);
    }

    #[test]
    fn relative_label_strips_root() {
        let label = SourceLocation::relative_label(
            Path::new("/repo"),
            Path::new("/repo/tests/unit/test_status.py"),
        );
        assert_eq!(label, "tests/unit/test_status.py");
        let outside = SourceLocation::relative_label(Path::new("/repo"), Path::new("/elsewhere/x"));
        assert_eq!(outside, "/elsewhere/x");
    }
}
