//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn run_goldthread(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_goldthread");
    Command::new(bin)
        .args(args)
        .env_remove("GOLDTHREAD_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run goldthread binary")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// MON-001 is covered, MON-002 is not, and one test names a missing id.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "reqs/mon/MON-001.yml", "uid: MON-001\ntext: Monitor reports health\n");
    write(
        root,
        "reqs/mon/MON-002.yml",
        "uid: MON-002\ntext: Status returns schema-shaped output\n",
    );
    write(
        root,
        "tests/test_monitor.py",
        "# HODOR-ID: TST-HEALTH\n# HODOR-REQS: MON-001\ndef test_health():\n    pass\n\n\
         def test_ghost():\n    \"\"\"Ghost.\n\n    Requirements:\n        - MON-999\n    \"\"\"\n",
    );
    dir
}

#[test]
fn help_exits_zero() {
    let output = run_goldthread(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("audit"));
    assert!(stdout.contains("check"));
}

#[test]
fn audit_help_lists_input_flags() {
    let output = run_goldthread(&["audit", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("--req-dir"));
    assert!(stdout.contains("--test-scan-dir"));
    assert!(stdout.contains("--strict"));
}

#[test]
fn bad_arguments_exit_two() {
    let output = run_goldthread(&["audit", "--dialect", "xml"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_root_exits_two_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("absent");
    let output = run_goldthread(&["audit", "--root", root.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr.contains("not found"));
    assert!(!root.join("visual").exists());
}

#[test]
fn audit_writes_artifacts_and_succeeds_with_orphans() {
    let dir = project();
    let root = dir.path();
    let output =
        run_goldthread(&["audit", "--root", root.to_str().unwrap(), "--test-scan-dir", "tests"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("ISSUES FOUND"));
    assert!(stdout.contains("Coverage: 50.0%"));

    let report = fs::read_to_string(root.join("visual/traceability_audit.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["summary"]["requirements"]["total"], 2);
    assert_eq!(report["summary"]["tests"]["broken"], 1);
    assert!(!root.join("visual/traceability_audit.json.tmp").exists());

    let orphans = fs::read_to_string(root.join("visual/traceability_orphans.tsv")).unwrap();
    assert_eq!(
        orphans,
        "broken-link\ttest\ttests/test_monitor.py#L9\ttests/test_monitor.py:9-10\tMON-999\n\
         orphaned-requirement\trequirement\tMON-002\treqs/mon/MON-002.yml:1\t\n"
    );
}

#[test]
fn strict_audit_exits_one() {
    let dir = project();
    let output = run_goldthread(&[
        "audit",
        "--root",
        dir.path().to_str().unwrap(),
        "--test-scan-dir",
        "tests",
        "--strict",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn check_prints_orphans_and_exits_one() {
    let dir = project();
    let root = dir.path().to_str().unwrap();
    let output = run_goldthread(&["check", "--root", root, "--test-scan-dir", "tests"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("MON-999"));
    assert!(!dir.path().join("visual").exists());
}

#[test]
fn check_passes_on_a_clean_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "reqs/mon/MON-001.yml", "uid: MON-001\ntext: Monitor reports health\n");
    write(
        root,
        "tests/health_test.rs",
        "/// Requirements:\n///   - MON-001\n#[test]\nfn health() {}\n",
    );
    let output = run_goldthread(&[
        "check",
        "--root",
        root.to_str().unwrap(),
        "--test-scan-dir",
        "tests",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let graph: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(graph["is_clean"], true);
    assert_eq!(graph["tests"][0]["references"][0]["name"], "health");
}

#[test]
fn config_file_in_root_is_honoured() {
    let dir = project();
    let root = dir.path();
    write(root, "goldthread.yaml", "test_scan_dirs: [tests]\ndialects: [structured-comment]\n");
    let output = run_goldthread(&["check", "--root", root.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    // The docstring block is ignored, so only the orphaned requirement remains.
    assert_eq!(stdout, "orphaned-requirement\trequirement\tMON-002\treqs/mon/MON-002.yml:1\t\n");
}

#[test]
fn invalid_config_exits_two() {
    let dir = project();
    write(dir.path(), "goldthread.yaml", "no_such_key: 1\n");
    let output = run_goldthread(&["check", "--root", dir.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no_such_key"));
}
