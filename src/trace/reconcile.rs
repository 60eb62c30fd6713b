//! Graph Reconciler: merges requirement and test nodes into one graph.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::diagnostics::ReconciliationWarning;
use crate::model::{NodeKind, RequirementNode, SourceLocation, TestAnnotationNode};

use super::graph::{DesignLink, Graph, TraceLink, UnresolvedReference};

/// Builds the trace graph.
///
/// Must only be called once every loader and scanner stage has finished.
/// Tests are ordered by location before anything else happens, so the result
/// does not depend on the order `tests` arrives in.
#[must_use]
pub fn reconcile(
    requirements: BTreeMap<String, RequirementNode>,
    mut tests: Vec<TestAnnotationNode>,
) -> Graph {
    tests.sort_by(|a, b| a.location.cmp(&b.location));

    let mut graph = Graph { requirements, ..Graph::default() };
    graph.tests = insert_tests(&graph.requirements, tests, &mut graph.warnings);

    for test in &graph.tests {
        for reference in &test.requirement_refs {
            if graph.requirements.contains_key(reference) {
                graph.links.insert(TraceLink {
                    requirement_id: reference.clone(),
                    test_id: test.id.clone(),
                    test_location: test.location.clone(),
                });
            } else {
                graph.unresolved.push(UnresolvedReference {
                    owner_kind: NodeKind::Test,
                    owner_id: test.id.clone(),
                    location: test.location.clone(),
                    missing_id: reference.clone(),
                });
            }
        }
    }

    for requirement in graph.requirements.values() {
        for link in &requirement.links {
            let mut named_tests = graph.tests.iter().filter(|t| t.id == *link).peekable();
            if graph.requirements.contains_key(link) {
                graph
                    .design_links
                    .insert(DesignLink { from: requirement.id.clone(), to: link.clone() });
            } else if named_tests.peek().is_some() {
                graph.declared_links.extend(named_tests.map(|test| TraceLink {
                    requirement_id: requirement.id.clone(),
                    test_id: test.id.clone(),
                    test_location: test.location.clone(),
                }));
            } else {
                graph.unresolved.push(UnresolvedReference {
                    owner_kind: NodeKind::Requirement,
                    owner_id: requirement.id.clone(),
                    location: requirement.location.clone(),
                    missing_id: link.clone(),
                });
            }
        }
    }
    graph.unresolved.sort();

    info!(
        requirements = graph.requirements.len(),
        tests = graph.tests.len(),
        links = graph.links.len(),
        declared_links = graph.declared_links.len(),
        design_links = graph.design_links.len(),
        unresolved = graph.unresolved.len(),
        warnings = graph.warnings.len(),
        "graph reconciled"
    );
    graph
}

/// Keeps every test node, reporting explicit-id collisions.
///
/// The same id at the same location is one block seen twice and is dropped.
fn insert_tests(
    requirements: &BTreeMap<String, RequirementNode>,
    tests: Vec<TestAnnotationNode>,
    warnings: &mut Vec<ReconciliationWarning>,
) -> Vec<TestAnnotationNode> {
    let mut first_seen: BTreeMap<String, SourceLocation> = BTreeMap::new();
    let mut kept = Vec::with_capacity(tests.len());
    for test in tests {
        match first_seen.entry(test.id.clone()) {
            Entry::Occupied(first) if *first.get() == test.location => {
                debug!(id = %test.id, location = %test.location, "dropping repeated block");
                continue;
            }
            Entry::Occupied(first) => warnings.push(ReconciliationWarning::DuplicateTestId {
                id: test.id.clone(),
                first: first.get().clone(),
                second: test.location.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(test.location.clone());
                if let Some(requirement) = requirements.get(&test.id) {
                    warnings.push(ReconciliationWarning::TestIdShadowsRequirement {
                        id: test.id.clone(),
                        test: test.location.clone(),
                        requirement: requirement.location.clone(),
                    });
                }
            }
        }
        kept.push(test);
    }
    kept
}
