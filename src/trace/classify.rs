//! Orphan Classifier: labels every graph node.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::{Diagnostics, ReconciliationWarning};
use crate::model::{NodeKind, SourceLocation};

use super::graph::{Graph, Node};

/// Classification of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeStatus {
    /// Requirement with a verifying test, or test whose every reference resolved.
    Satisfied,
    /// Requirement no test verifies.
    OrphanedRequirement,
    /// Test that names no requirement.
    OrphanedTest,
    /// Test naming at least one requirement that does not exist.
    BrokenLink,
}

impl NodeStatus {
    /// Returns `true` for every status except [`NodeStatus::Satisfied`].
    #[must_use]
    pub fn is_orphan(self) -> bool {
        self != Self::Satisfied
    }

    /// The kebab-case label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::OrphanedRequirement => "orphaned-requirement",
            Self::OrphanedTest => "orphaned-test",
            Self::BrokenLink => "broken-link",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How colliding explicit test ids affect the clean verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Report the collision; the run can still be clean.
    #[default]
    Warn,
    /// Report the collision and mark the run unclean.
    Fail,
}

/// One node with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedNode {
    /// Node id.
    pub id: String,
    /// Requirement or test.
    pub kind: NodeKind,
    /// Classification.
    pub status: NodeStatus,
    /// Where the node was declared.
    pub location: SourceLocation,
    /// Ids on the other side of this node's trace links.
    pub linked: Vec<String>,
    /// Ids this node names that match nothing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_ids: Vec<String>,
}

/// The reconciled graph annotated with node statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedGraph {
    graph: Graph,
    nodes: Vec<ClassifiedNode>,
    diagnostics: Diagnostics,
    duplicate_policy: DuplicatePolicy,
}

/// Classifies every node of a complete graph.
///
/// `diagnostics` are the load and scan results of the same run; they take
/// part in [`ClassifiedGraph::is_clean`].
#[must_use]
pub fn classify(
    graph: Graph,
    diagnostics: Diagnostics,
    duplicate_policy: DuplicatePolicy,
) -> ClassifiedGraph {
    let nodes: Vec<ClassifiedNode> =
        graph.nodes().map(|node| classify_node(&graph, node)).collect();
    let classified = ClassifiedGraph { graph, nodes, diagnostics, duplicate_policy };
    info!(
        orphans = classified.orphans().count(),
        is_clean = classified.is_clean(),
        "graph classified"
    );
    classified
}

fn classify_node(graph: &Graph, node: Node<'_>) -> ClassifiedNode {
    let missing: Vec<String> = graph
        .unresolved_for(node.kind(), node.id(), node.location())
        .into_iter()
        .map(str::to_string)
        .collect();
    let (status, linked) = match node {
        Node::Requirement(requirement) => {
            let linked = graph.tests_verifying(&requirement.id);
            let status = if linked.is_empty() {
                NodeStatus::OrphanedRequirement
            } else {
                NodeStatus::Satisfied
            };
            (status, linked)
        }
        Node::Test(test) => {
            let linked = graph.requirements_verified_by(test);
            let status = if !missing.is_empty() {
                NodeStatus::BrokenLink
            } else if test.requirement_refs.is_empty() {
                NodeStatus::OrphanedTest
            } else {
                NodeStatus::Satisfied
            };
            (status, linked)
        }
    };
    ClassifiedNode {
        id: node.id().to_string(),
        kind: node.kind(),
        status,
        location: node.location().clone(),
        linked: linked.into_iter().map(str::to_string).collect(),
        missing_ids: missing,
    }
}

impl ClassifiedGraph {
    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Every node: requirements in id order, then tests in location order.
    #[must_use]
    pub fn nodes(&self) -> &[ClassifiedNode] {
        &self.nodes
    }

    /// Load and scan diagnostics of the run.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Nodes that are not satisfied.
    pub fn orphans(&self) -> impl Iterator<Item = &ClassifiedNode> {
        self.nodes.iter().filter(|n| n.status.is_orphan())
    }

    /// Number of nodes of `kind` with `status`.
    #[must_use]
    pub fn count(&self, kind: NodeKind, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind && n.status == status).count()
    }

    /// Number of nodes of `kind`.
    #[must_use]
    pub fn total(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Returns `true` when every node is satisfied and the run recorded no
    /// blocking diagnostics.
    ///
    /// Under [`DuplicatePolicy::Fail`], colliding explicit test ids also make
    /// the run unclean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        let duplicates_block = self.duplicate_policy == DuplicatePolicy::Fail
            && self
                .graph
                .warnings()
                .iter()
                .any(|w| matches!(w, ReconciliationWarning::DuplicateTestId { .. }));
        self.orphans().next().is_none()
            && self.diagnostics.blocking_count() == 0
            && !duplicates_block
    }
}
