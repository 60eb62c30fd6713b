//! Audit report artifacts.
//!
//! [`AuditReport`] is the machine-readable boundary to whatever renders the
//! final document. Its `graph` section is a pure function of the inputs;
//! only `meta` carries run-specific values such as the generation time.

mod orphans;
mod summary;
mod write;

pub use orphans::format_orphan_list;
pub use summary::format_summary;
pub use write::write_atomic;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diagnostics::{Diagnostics, ReconciliationWarning};
use crate::model::{NodeKind, RequirementNode, TestAnnotationNode};
use crate::trace::{
    ClassifiedGraph, ClassifiedNode, DesignLink, NodeStatus, TraceLink, UnresolvedReference,
};

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    /// Report title.
    pub title: String,
    /// Report subtitle.
    pub subtitle: String,
    /// Display label of the audited root.
    pub source_root: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that produced the report.
    pub tool_version: &'static str,
}

/// Requirement counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequirementCounts {
    /// All loaded requirements.
    pub total: usize,
    /// Requirements with at least one verifying test.
    pub satisfied: usize,
    /// Requirements nothing verifies.
    pub orphaned: usize,
}

/// Test counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TestCounts {
    /// All test nodes.
    pub total: usize,
    /// Tests whose every reference resolved.
    pub satisfied: usize,
    /// Tests naming no requirement.
    pub orphaned: usize,
    /// Tests naming a missing requirement.
    pub broken: usize,
}

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Requirement counts.
    pub requirements: RequirementCounts,
    /// Test counts.
    pub tests: TestCounts,
    /// Trace links from test references.
    pub links: usize,
    /// Trace links declared by requirements.
    pub declared_links: usize,
    /// Requirement-to-requirement links.
    pub design_links: usize,
    /// References that matched nothing.
    pub unresolved: usize,
    /// Share of requirements with a verifying test, in percent, to one decimal.
    pub coverage_pct: f64,
    /// Load, scan, and reconciliation diagnostics.
    pub diagnostics: usize,
    /// Whether the run found no issues.
    pub is_clean: bool,
}

impl Summary {
    /// Computes the summary of a classified graph.
    #[must_use]
    pub fn of(graph: &ClassifiedGraph) -> Self {
        let requirements = RequirementCounts {
            total: graph.total(NodeKind::Requirement),
            satisfied: graph.count(NodeKind::Requirement, NodeStatus::Satisfied),
            orphaned: graph.count(NodeKind::Requirement, NodeStatus::OrphanedRequirement),
        };
        let tests = TestCounts {
            total: graph.total(NodeKind::Test),
            satisfied: graph.count(NodeKind::Test, NodeStatus::Satisfied),
            orphaned: graph.count(NodeKind::Test, NodeStatus::OrphanedTest),
            broken: graph.count(NodeKind::Test, NodeStatus::BrokenLink),
        };
        Self {
            requirements,
            tests,
            links: graph.graph().links().len(),
            declared_links: graph.graph().declared_links().len(),
            design_links: graph.graph().design_links().len(),
            unresolved: graph.graph().unresolved().len(),
            coverage_pct: coverage_pct(requirements.satisfied, requirements.total),
            diagnostics: graph.diagnostics().len() + graph.graph().warnings().len(),
            is_clean: graph.is_clean(),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn coverage_pct(satisfied: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1000.0 * satisfied as f64 / total as f64).round() / 10.0
}

/// A requirement with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementEntry<'a> {
    /// The loaded record.
    #[serde(flatten)]
    pub node: &'a RequirementNode,
    /// Classification.
    pub status: NodeStatus,
    /// Ids of the verifying tests.
    pub verified_by: &'a [String],
    /// Links that matched nothing.
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub missing_ids: &'a [String],
}

/// A test with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct TestEntry<'a> {
    /// The scanned annotation or test item.
    #[serde(flatten)]
    pub node: &'a TestAnnotationNode,
    /// Classification.
    pub status: NodeStatus,
    /// Ids of the requirements this test verifies.
    pub verifies: &'a [String],
    /// Requirement ids that do not exist.
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub missing_ids: &'a [String],
}

/// The classified graph in report form.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSection<'a> {
    /// See [`ClassifiedGraph::is_clean`].
    pub is_clean: bool,
    /// Requirements in id order.
    pub requirements: Vec<RequirementEntry<'a>>,
    /// Tests in file-then-line order.
    pub tests: Vec<TestEntry<'a>>,
    /// Trace links from test references.
    pub links: Vec<&'a TraceLink>,
    /// Trace links declared by requirements.
    pub declared_links: Vec<&'a TraceLink>,
    /// Requirement-to-requirement links.
    pub design_links: Vec<&'a DesignLink>,
    /// References that matched nothing.
    pub unresolved: &'a [UnresolvedReference],
    /// Every node that is not satisfied.
    pub orphans: Vec<&'a ClassifiedNode>,
}

impl<'a> GraphSection<'a> {
    /// Builds the section from a classified graph.
    #[must_use]
    pub fn of(classified: &'a ClassifiedGraph) -> Self {
        let graph = classified.graph();
        let by_kind = |kind: NodeKind| classified.nodes().iter().filter(move |n| n.kind == kind);

        let requirements = graph
            .requirements()
            .values()
            .zip(by_kind(NodeKind::Requirement))
            .map(|(node, c)| RequirementEntry {
                node,
                status: c.status,
                verified_by: &c.linked,
                missing_ids: &c.missing_ids,
            })
            .collect();
        let tests = graph
            .tests()
            .iter()
            .zip(by_kind(NodeKind::Test))
            .map(|(node, c)| TestEntry {
                node,
                status: c.status,
                verifies: &c.linked,
                missing_ids: &c.missing_ids,
            })
            .collect();

        Self {
            is_clean: classified.is_clean(),
            requirements,
            tests,
            links: graph.links().iter().collect(),
            declared_links: graph.declared_links().iter().collect(),
            design_links: graph.design_links().iter().collect(),
            unresolved: graph.unresolved(),
            orphans: classified.orphans().collect(),
        }
    }
}

/// Every diagnostic of the run.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsSection<'a> {
    /// Load and scan diagnostics.
    #[serde(flatten)]
    pub diagnostics: &'a Diagnostics,
    /// Graph-building conflicts.
    pub reconciliation_warnings: &'a [ReconciliationWarning],
}

/// The full report artifact.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport<'a> {
    /// Run metadata.
    pub meta: ReportMeta,
    /// Headline numbers.
    pub summary: Summary,
    /// Classified graph.
    pub graph: GraphSection<'a>,
    /// Diagnostics.
    pub diagnostics: DiagnosticsSection<'a>,
}

impl<'a> AuditReport<'a> {
    /// Assembles the report for a classified graph.
    #[must_use]
    pub fn new(meta: ReportMeta, classified: &'a ClassifiedGraph) -> Self {
        Self {
            meta,
            summary: Summary::of(classified),
            graph: GraphSection::of(classified),
            diagnostics: DiagnosticsSection {
                diagnostics: classified.diagnostics(),
                reconciliation_warnings: classified.graph().warnings(),
            },
        }
    }

    /// Serializes the report as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Serializes only the classified graph section.
///
/// The output depends on nothing but the inputs, so two runs over the same
/// tree produce identical bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn graph_json(classified: &ClassifiedGraph) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(&GraphSection::of(classified))?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::BTreeMap;

    use crate::diagnostics::Diagnostics;
    use crate::model::{AnnotationSource, RequirementNode, SourceLocation, TestAnnotationNode};
    use crate::trace::{classify, reconcile, ClassifiedGraph, DuplicatePolicy};

    /// MON-001 covered, MON-002 orphaned, one broken and one orphaned test.
    pub(crate) fn mixed_graph() -> ClassifiedGraph {
        let requirements: BTreeMap<String, RequirementNode> = [
            ("MON-001", "Monitor reports health"),
            ("MON-002", "Status returns schema-shaped output"),
        ]
        .into_iter()
        .map(|(id, text)| {
            let node = RequirementNode {
                id: id.to_string(),
                text: text.to_string(),
                links: Vec::new(),
                location: SourceLocation::at(format!("reqs/mon/{id}.yml"), 1),
            };
            (id.to_string(), node)
        })
        .collect();
        let test = |id: &str, refs: &[&str], line: usize| TestAnnotationNode {
            id: id.to_string(),
            requirement_refs: refs.iter().map(ToString::to_string).collect(),
            description: None,
            references: Vec::new(),
            source: AnnotationSource::StructuredComment,
            location: SourceLocation::at("tests/test_monitor.py", line),
        };
        let tests = vec![
            test("TST-HEALTH", &["MON-001"], 3),
            test("TST-GHOST", &["MON-999"], 10),
            test("tests/test_monitor.py#L20", &[], 20),
        ];
        classify(reconcile(requirements, tests), Diagnostics::default(), DuplicatePolicy::Warn)
    }
}
