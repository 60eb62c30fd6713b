//! Test item records: YAML files that describe tests rather than requirements.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::context::ServiceContext;
use crate::diagnostics::{AuditError, LoadError};
use crate::model::{AnnotationSource, TestAnnotationNode};

use super::record::extract_references;
use super::{load_records, LoadOptions};

/// Test nodes loaded from test item directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestItemLoad {
    /// Test nodes in discovery order.
    pub tests: Vec<TestAnnotationNode>,
    /// Files that could not be loaded.
    pub errors: Vec<LoadError>,
}

/// Loads YAML test items; each record's `links` are the requirements it
/// verifies and a `References:` list in its text names executable tests.
///
/// # Errors
///
/// Returns an error only when a directory is missing or cannot be listed.
pub fn load_test_items(
    ctx: &ServiceContext,
    root: &Path,
    dirs: &[PathBuf],
    options: &LoadOptions,
) -> Result<TestItemLoad, AuditError> {
    let (records, errors) = load_records(ctx, root, dirs, options, "Test item")?;

    let tests: Vec<TestAnnotationNode> = records
        .into_iter()
        .map(|record| TestAnnotationNode {
            references: extract_references(&record.text),
            id: record.uid,
            requirement_refs: record.links,
            description: Some(record.text),
            source: AnnotationSource::TestItem,
            location: record.location,
        })
        .collect();

    info!(loaded = tests.len(), errors = errors.len(), "test items loaded");
    Ok(TestItemLoad { tests, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use crate::model::TestReference;

    #[test]
    fn test_items_become_test_nodes() {
        let fs = MemoryFileSystem::new().with_file(
            "/repo/reqs/tst/TST-001.yml",
            concat!(
                "uid: TST-001\n",
                "text: |\n",
                "  Status schema test.\n",
                "\n",
                "  References:\n",
                "  - tests/test_status.py::test_schema\n",
                "links:\n",
                "  - MON-002: 3f2a\n",
            ),
        );
        let ctx = ServiceContext::in_memory(fs);
        let options =
            LoadOptions { skip_dirs: vec![], skip_names: vec![], uid_from_file_stem: false };

        let loaded =
            load_test_items(&ctx, Path::new("/repo"), &[PathBuf::from("reqs/tst")], &options)
                .unwrap();

        assert!(loaded.errors.is_empty());
        let test = &loaded.tests[0];
        assert_eq!(test.id, "TST-001");
        assert_eq!(test.requirement_refs, vec!["MON-002"]);
        assert_eq!(test.source, AnnotationSource::TestItem);
        assert_eq!(
            test.references,
            vec![TestReference::parse("tests/test_status.py::test_schema")]
        );
    }

    #[test]
    fn missing_test_item_dir_is_fatal() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::new().with_file("/repo/a", ""));
        let options =
            LoadOptions { skip_dirs: vec![], skip_names: vec![], uid_from_file_stem: false };
        let err = load_test_items(&ctx, Path::new("/repo"), &[PathBuf::from("reqs/tst")], &options)
            .unwrap_err();
        assert!(matches!(err, AuditError::MissingInput { label: "Test item", .. }));
    }
}
