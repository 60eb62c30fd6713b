//! Requirement node type.

use serde::{Deserialize, Serialize};

use super::SourceLocation;

/// A requirement loaded from the requirement store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementNode {
    /// Unique identifier (the record's `uid`).
    pub id: String,
    /// Requirement statement, never empty.
    pub text: String,
    /// Forward links to other items (parents, design items, or tests).
    #[serde(default)]
    pub links: Vec<String>,
    /// Where the record was read from.
    pub location: SourceLocation,
}
