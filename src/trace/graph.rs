//! The reconciled trace graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::diagnostics::ReconciliationWarning;
use crate::model::{NodeKind, RequirementNode, SourceLocation, TestAnnotationNode};

/// Verification edge between a requirement and one test node.
///
/// Test nodes may share an explicit id, so the edge also names the node's
/// location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TraceLink {
    /// The covered requirement.
    pub requirement_id: String,
    /// The covering test.
    pub test_id: String,
    /// Where the covering test was declared.
    pub test_location: SourceLocation,
}

impl TraceLink {
    fn is_from(&self, test: &TestAnnotationNode) -> bool {
        self.test_id == test.id && self.test_location == test.location
    }
}

/// Requirement-to-requirement edge (parent or design item).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DesignLink {
    /// Requirement declaring the link.
    pub from: String,
    /// Linked requirement.
    pub to: String,
}

/// An identifier a node refers to that matches nothing in the graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UnresolvedReference {
    /// Kind of the node holding the reference.
    pub owner_kind: NodeKind,
    /// Id of the node holding the reference.
    pub owner_id: String,
    /// Where the owning node was declared.
    pub location: SourceLocation,
    /// The id that could not be resolved.
    pub missing_id: String,
}

/// Either side of the graph, borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    /// A requirement node.
    Requirement(&'a RequirementNode),
    /// A test node.
    Test(&'a TestAnnotationNode),
}

impl<'a> Node<'a> {
    /// The node's id.
    #[must_use]
    pub fn id(&self) -> &'a str {
        match self {
            Self::Requirement(r) => &r.id,
            Self::Test(t) => &t.id,
        }
    }

    /// Which side of the graph the node sits on.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Requirement(_) => NodeKind::Requirement,
            Self::Test(_) => NodeKind::Test,
        }
    }

    /// Where the node was declared.
    #[must_use]
    pub fn location(&self) -> &'a SourceLocation {
        match self {
            Self::Requirement(r) => &r.location,
            Self::Test(t) => &t.location,
        }
    }
}

/// Requirements, tests, and the edges between them.
///
/// Built only by [`reconcile`](super::reconcile) and read-only afterwards.
/// Requirements are keyed by id; tests are kept in location order and may
/// share an id when two blocks declare the same explicit one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub(super) requirements: BTreeMap<String, RequirementNode>,
    pub(super) tests: Vec<TestAnnotationNode>,
    pub(super) links: BTreeSet<TraceLink>,
    pub(super) declared_links: BTreeSet<TraceLink>,
    pub(super) design_links: BTreeSet<DesignLink>,
    pub(super) unresolved: Vec<UnresolvedReference>,
    pub(super) warnings: Vec<ReconciliationWarning>,
}

impl Graph {
    /// Requirements keyed by id.
    #[must_use]
    pub fn requirements(&self) -> &BTreeMap<String, RequirementNode> {
        &self.requirements
    }

    /// Test nodes in file-then-line order.
    #[must_use]
    pub fn tests(&self) -> &[TestAnnotationNode] {
        &self.tests
    }

    /// Edges from test references, sorted by requirement then test.
    #[must_use]
    pub fn links(&self) -> &BTreeSet<TraceLink> {
        &self.links
    }

    /// Edges from requirement `links` entries that name a test.
    ///
    /// These cover the requirement but say nothing about the test's own
    /// references.
    #[must_use]
    pub fn declared_links(&self) -> &BTreeSet<TraceLink> {
        &self.declared_links
    }

    /// Requirement-to-requirement edges.
    #[must_use]
    pub fn design_links(&self) -> &BTreeSet<DesignLink> {
        &self.design_links
    }

    /// References that matched no node.
    #[must_use]
    pub fn unresolved(&self) -> &[UnresolvedReference] {
        &self.unresolved
    }

    /// Conflicts noticed while building the graph.
    #[must_use]
    pub fn warnings(&self) -> &[ReconciliationWarning] {
        &self.warnings
    }

    /// Looks up a requirement by id.
    #[must_use]
    pub fn requirement(&self, id: &str) -> Option<&RequirementNode> {
        self.requirements.get(id)
    }

    /// Every node: requirements in id order, then tests in location order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        self.requirements
            .values()
            .map(Node::Requirement)
            .chain(self.tests.iter().map(Node::Test))
    }

    /// Ids of the tests verifying `requirement_id`, from either side.
    #[must_use]
    pub fn tests_verifying(&self, requirement_id: &str) -> Vec<&str> {
        let ids: BTreeSet<&str> = self
            .links
            .iter()
            .chain(&self.declared_links)
            .filter(|l| l.requirement_id == requirement_id)
            .map(|l| l.test_id.as_str())
            .collect();
        ids.into_iter().collect()
    }

    /// Ids of the requirements the given test node's own references resolve to.
    #[must_use]
    pub fn requirements_verified_by(&self, test: &TestAnnotationNode) -> Vec<&str> {
        self.links
            .iter()
            .filter(|l| l.is_from(test))
            .map(|l| l.requirement_id.as_str())
            .collect()
    }

    /// Unresolved references held by one node.
    #[must_use]
    pub fn unresolved_for(
        &self,
        kind: NodeKind,
        id: &str,
        location: &SourceLocation,
    ) -> Vec<&str> {
        self.unresolved
            .iter()
            .filter(|u| u.owner_kind == kind && u.owner_id == id && u.location == *location)
            .map(|u| u.missing_id.as_str())
            .collect()
    }
}
