//! Trace graph data model.
//!
//! Defines the node types produced by the loader and scanner and consumed by
//! the reconciler, classifier, and report.

mod annotation;
mod identifier;
mod location;
mod requirement;

pub use annotation::{AnnotationSource, TestAnnotationNode, TestReference};
pub use identifier::{derive_test_id, is_valid_identifier, split_identifier_list};
pub use location::SourceLocation;
pub use requirement::RequirementNode;

use serde::{Deserialize, Serialize};

/// Which side of the trace graph a node sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A requirement record.
    Requirement,
    /// A test annotation or test item.
    Test,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requirement => f.write_str("requirement"),
            Self::Test => f.write_str("test"),
        }
    }
}
