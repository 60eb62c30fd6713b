//! End-to-end trace scenarios against real temporary directories.

use std::fs;
use std::path::Path;

use goldthread::audit::build;
use goldthread::config::AuditConfig;
use goldthread::context::ServiceContext;
use goldthread::diagnostics::LoadError;
use goldthread::model::NodeKind;
use goldthread::report::graph_json;
use goldthread::trace::{ClassifiedGraph, NodeStatus};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("reqs/mon")).unwrap();
    fs::create_dir_all(dir.path().join("tests")).unwrap();
    for (rel, contents) in files {
        write(dir.path(), rel, contents);
    }
    dir
}

fn audit(dir: &TempDir) -> ClassifiedGraph {
    let config = AuditConfig {
        root: dir.path().to_path_buf(),
        test_scan_dirs: vec!["tests".into()],
        ..AuditConfig::default()
    };
    build(&ServiceContext::live(), &config).unwrap()
}

fn status(graph: &ClassifiedGraph, kind: NodeKind, id: &str) -> NodeStatus {
    graph
        .nodes()
        .iter()
        .find(|n| n.kind == kind && n.id == id)
        .map(|n| n.status)
        .unwrap_or_else(|| panic!("no {kind} node {id}"))
}

const MON_002: (&str, &str) =
    ("reqs/mon/MON-002.yml", "uid: MON-002\ntext: Status returns schema-shaped output\n");

#[test]
fn requirement_without_tests_is_orphaned() {
    let graph = audit(&tree(&[MON_002]));
    assert_eq!(status(&graph, NodeKind::Requirement, "MON-002"), NodeStatus::OrphanedRequirement);
    assert!(!graph.is_clean());
}

#[test]
fn matching_annotation_satisfies_both_nodes() {
    let graph = audit(&tree(&[
        MON_002,
        ("tests/test_status.py", "# HODOR-REQS: MON-002\ndef test_status():\n    pass\n"),
    ]));
    assert_eq!(status(&graph, NodeKind::Requirement, "MON-002"), NodeStatus::Satisfied);
    assert_eq!(status(&graph, NodeKind::Test, "tests/test_status.py#L1"), NodeStatus::Satisfied);
    assert_eq!(graph.graph().links().len(), 1);
    assert!(graph.is_clean());
}

#[test]
fn annotation_naming_missing_requirement_is_broken() {
    let graph = audit(&tree(&[(
        "tests/test_status.py",
        "# HODOR-ID: TST-GHOST\n# HODOR-REQS: MON-999\n",
    )]));
    let node = graph.nodes().iter().find(|n| n.id == "TST-GHOST").unwrap();
    assert_eq!(node.status, NodeStatus::BrokenLink);
    assert_eq!(node.missing_ids, vec!["MON-999"]);
    assert!(graph.graph().links().is_empty());
}

#[test]
fn annotation_without_requirements_is_an_orphaned_test() {
    let graph = audit(&tree(&[(
        "tests/test_status.py",
        "def test_status():\n    # HODOR-TEXT: checks the status page\n    pass\n",
    )]));
    assert_eq!(status(&graph, NodeKind::Test, "tests/test_status.py#L2"), NodeStatus::OrphanedTest);
}

#[test]
fn duplicate_requirement_uid_keeps_the_first() {
    let graph = audit(&tree(&[
        ("reqs/mon/a.yml", "uid: MON-001\ntext: First\n"),
        ("reqs/mon/b.yml", "uid: MON-001\ntext: Second\n"),
    ]));
    assert_eq!(graph.graph().requirements().len(), 1);
    assert_eq!(graph.graph().requirement("MON-001").unwrap().text, "First");
    match &graph.diagnostics().load_errors[..] {
        [LoadError::DuplicateId { id, first, second }] => {
            assert_eq!(id, "MON-001");
            assert_eq!(first.path, "reqs/mon/a.yml");
            assert_eq!(second.path, "reqs/mon/b.yml");
        }
        other => panic!("unexpected load errors: {other:?}"),
    }
    assert!(!graph.is_clean());
}

#[test]
fn missing_design_link_is_owned_by_the_requirement() {
    let graph = audit(&tree(&[
        ("reqs/mon/MON-001.yml", "uid: MON-001\ntext: Health\nlinks: [R2]\n"),
        ("tests/test_health.py", "# HODOR-REQS: MON-001\n"),
    ]));
    let unresolved = graph.graph().unresolved();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].owner_kind, NodeKind::Requirement);
    assert_eq!(unresolved[0].owner_id, "MON-001");
    assert_eq!(unresolved[0].missing_id, "R2");
    // Only test-side references can break a link.
    assert_eq!(status(&graph, NodeKind::Requirement, "MON-001"), NodeStatus::Satisfied);
    assert_eq!(status(&graph, NodeKind::Test, "tests/test_health.py#L1"), NodeStatus::Satisfied);
}

#[test]
fn every_block_becomes_one_node_across_dialects() {
    let graph = audit(&tree(&[
        MON_002,
        (
            "tests/test_mixed.py",
            concat!(
                "# HODOR-REQS: MON-002\n",
                "def test_a():\n",
                "    \"\"\"A.\n",
                "\n",
                "    Requirements:\n",
                "        - MON-002\n",
                "    \"\"\"\n",
                "\n",
                "# HODOR-REQS: MON-002\n",
                "# HODOR-TEXT: b\n",
                "def test_b():\n",
                "    pass\n",
            ),
        ),
        (
            "tests/unit/status_test.rs",
            "/// Requirements:\n///   - MON-002\n#[test]\nfn status() {}\n",
        ),
    ]));
    let ids: Vec<&str> = graph.graph().tests().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "tests/test_mixed.py#L1",
            "tests/test_mixed.py#L5",
            "tests/test_mixed.py#L9",
            "tests/unit/status_test.rs#L1",
        ]
    );
    assert!(graph.is_clean());
}

#[test]
fn repeated_runs_produce_identical_graphs() {
    let dir = tree(&[
        MON_002,
        ("reqs/mon/MON-001.yml", "uid: MON-001\ntext: Health\nlinks: [MON-002, R9]\n"),
        ("tests/b_test.py", "# HODOR-REQS: MON-001; MON-404\n"),
        ("tests/a_test.py", "# HODOR-REQS:\n"),
    ]);
    let first = graph_json(&audit(&dir)).unwrap();
    let second = graph_json(&audit(&dir)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn malformed_files_do_not_stop_the_run() {
    let graph = audit(&tree(&[
        MON_002,
        ("reqs/mon/broken.yml", "uid: [unclosed\n"),
        ("tests/test_status.py", "# HODOR-REQS: MON-002\n\n# HODOR-BOGUS: x\n"),
    ]));
    assert_eq!(status(&graph, NodeKind::Requirement, "MON-002"), NodeStatus::Satisfied);
    assert_eq!(graph.diagnostics().load_errors.len(), 1);
    assert_eq!(graph.diagnostics().scan_warnings.len(), 1);
    assert!(!graph.is_clean());
}

#[test]
fn tests_sharing_an_explicit_id_keep_their_own_links() {
    let graph = audit(&tree(&[
        ("reqs/mon/MON-001.yml", "uid: MON-001\ntext: Health\n"),
        ("tests/a_test.py", "# HODOR-ID: T-1\n# HODOR-TEXT: no requirements here\n"),
        ("tests/b_test.py", "# HODOR-ID: T-1\n# HODOR-REQS: MON-001\n"),
    ]));
    let tests: Vec<(&str, NodeStatus)> = graph
        .nodes()
        .iter()
        .filter(|n| n.kind == NodeKind::Test)
        .map(|n| (n.location.path.as_str(), n.status))
        .collect();
    assert_eq!(
        tests,
        vec![
            ("tests/a_test.py", NodeStatus::OrphanedTest),
            ("tests/b_test.py", NodeStatus::Satisfied),
        ]
    );
    assert!(!graph.is_clean());
}

#[test]
fn requirement_naming_a_test_leaves_the_test_orphaned() {
    let graph = audit(&tree(&[
        ("reqs/mon/MON-001.yml", "uid: MON-001\ntext: Health\nlinks: [T-1]\n"),
        ("tests/a_test.py", "# HODOR-ID: T-1\n"),
    ]));
    assert_eq!(status(&graph, NodeKind::Requirement, "MON-001"), NodeStatus::Satisfied);
    assert_eq!(status(&graph, NodeKind::Test, "T-1"), NodeStatus::OrphanedTest);
    assert_eq!(graph.graph().declared_links().len(), 1);
    assert!(graph.graph().links().is_empty());
    assert!(!graph.is_clean());
}

#[test]
fn overlapping_requirement_dirs_load_each_record_once() {
    let dir = tree(&[
        ("reqs/mon/MON-001.yml", "uid: MON-001\ntext: Health\n"),
        ("tests/a_test.py", "# HODOR-REQS: MON-001\n"),
    ]);
    let config = AuditConfig {
        root: dir.path().to_path_buf(),
        requirement_dirs: vec!["reqs".into(), "reqs/mon".into()],
        test_scan_dirs: vec!["tests".into()],
        ..AuditConfig::default()
    };
    let graph = build(&ServiceContext::live(), &config).unwrap();
    assert!(graph.diagnostics().load_errors.is_empty());
    assert_eq!(graph.graph().requirements().len(), 1);
    assert!(graph.is_clean());
}
