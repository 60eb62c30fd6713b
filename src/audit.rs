//! The audit pipeline: load and scan, then reconcile, then classify.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::AuditConfig;
use crate::context::ServiceContext;
use crate::diagnostics::{AuditError, Diagnostics};
use crate::loader::{load_requirements, load_test_items};
use crate::report::{format_orphan_list, write_atomic, AuditReport, ReportMeta};
use crate::scanner::scan_tree;
use crate::trace::{classify, reconcile, ClassifiedGraph};

/// Runs every stage and returns the classified graph.
///
/// The requirement loader and the test-side stages run concurrently; the
/// reconciler starts only once both have finished.
///
/// # Errors
///
/// Returns an error if the root or a configured directory is missing or
/// unreadable. Per-file problems are collected, not returned.
pub fn build(ctx: &ServiceContext, config: &AuditConfig) -> Result<ClassifiedGraph, AuditError> {
    let root = &config.root;
    if !ctx.fs.is_dir(root) {
        return Err(AuditError::MissingInput { label: "Audit root", path: root.clone() });
    }
    info!(root = %root.display(), "starting audit");

    let load_options = config.load_options();
    let scan_options = config.scan_options();
    let (requirements, (items, scanned)) = rayon::join(
        || load_requirements(ctx, root, &config.requirement_dirs, &load_options),
        || {
            rayon::join(
                || load_test_items(ctx, root, &config.test_item_dirs, &load_options),
                || scan_tree(ctx, root, &config.test_scan_dirs, &scan_options),
            )
        },
    );
    let (requirements, items, scanned) = (requirements?, items?, scanned?);

    let diagnostics = Diagnostics {
        load_errors: requirements.errors.into_iter().chain(items.errors).collect(),
        scan_warnings: scanned.warnings,
    };
    for error in &diagnostics.load_errors {
        warn!("{error}");
    }
    for warning in &diagnostics.scan_warnings {
        if warning.is_informational() {
            info!("{warning}");
        } else {
            warn!("{warning}");
        }
    }

    let mut tests = items.tests;
    tests.extend(scanned.annotations);
    let graph = reconcile(requirements.requirements, tests);
    for warning in graph.warnings() {
        warn!("{warning}");
    }

    Ok(classify(graph, diagnostics, config.duplicate_test_ids))
}

/// Report metadata for a run, stamped with the context clock.
#[must_use]
pub fn report_meta(ctx: &ServiceContext, config: &AuditConfig) -> ReportMeta {
    ReportMeta {
        title: config.title.clone(),
        subtitle: config.subtitle.clone(),
        source_root: config.display_root().to_string(),
        generated_at: ctx.clock.now(),
        tool_version: env!("CARGO_PKG_VERSION"),
    }
}

/// Paths of the artifacts a run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    /// JSON report.
    pub report: PathBuf,
    /// Tab-separated orphan list.
    pub orphans: PathBuf,
}

/// Writes the report and the orphan list for a classified graph.
///
/// Both files are written to temporary siblings before either is renamed
/// into place.
///
/// # Errors
///
/// Returns an error if serialization or either write fails.
pub fn write_artifacts(
    ctx: &ServiceContext,
    config: &AuditConfig,
    graph: &ClassifiedGraph,
) -> Result<WrittenArtifacts, AuditError> {
    let report = AuditReport::new(report_meta(ctx, config), graph);
    let json = report.to_json()?;

    let artifacts =
        WrittenArtifacts { report: config.output_path(), orphans: config.orphans_path() };
    let orphans = format_orphan_list(graph);
    write_atomic(
        ctx,
        &[
            (artifacts.report.as_path(), json.as_str()),
            (artifacts.orphans.as_path(), orphans.as_str()),
        ],
    )?;
    info!(
        report = %artifacts.report.display(),
        orphans = %artifacts.orphans.display(),
        "artifacts written"
    );
    Ok(artifacts)
}
