//! Test annotation node type.

use serde::{Deserialize, Serialize};

use super::SourceLocation;

/// Where a test node was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationSource {
    /// A run of `<PREFIX>-<KEY>:` comment lines.
    StructuredComment,
    /// A labelled requirement list inside a documentation block.
    DocstringBlock,
    /// A YAML test item from a test item directory.
    TestItem,
}

/// Pointer to an executable test.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestReference {
    /// File containing the test.
    pub path: String,
    /// Qualified test name within the file, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TestReference {
    /// Parses `path` or `path::qualified::name`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.split_once("::") {
            Some((path, name)) if !name.is_empty() => {
                Self { path: path.to_string(), name: Some(name.to_string()) }
            }
            _ => Self { path: value.trim_end_matches("::").to_string(), name: None },
        }
    }
}

impl std::fmt::Display for TestReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}::{name}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// A test discovered in the test tree (or a test item record).
///
/// `id` is either declared explicitly or derived from the block's location;
/// nothing downstream depends on which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAnnotationNode {
    /// Node identifier.
    pub id: String,
    /// Requirement ids this test claims to verify; empty for an orphan test.
    #[serde(default)]
    pub requirement_refs: Vec<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Executable test locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<TestReference>,
    /// How the node was discovered.
    pub source: AnnotationSource,
    /// Line span of the annotation block.
    pub location: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_parses_qualified_names() {
        let r = TestReference::parse("tests/test_status.py::TestStatus::test_schema");
        assert_eq!(r.path, "tests/test_status.py");
        assert_eq!(r.name.as_deref(), Some("TestStatus::test_schema"));
        assert_eq!(r.to_string(), "tests/test_status.py::TestStatus::test_schema");
    }

    #[test]
    fn reference_without_name_is_path_only() {
        assert_eq!(
            TestReference::parse("tests/test_status.py"),
            TestReference { path: "tests/test_status.py".into(), name: None }
        );
    }
}
