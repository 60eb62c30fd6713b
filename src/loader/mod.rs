//! Requirement Loader.
//!
//! Discovers YAML item records under one or more directories and turns them
//! into graph nodes. Loading has partial-failure semantics: a bad file yields
//! a [`LoadError`] and the remaining files still load.

mod items;
mod record;

pub use items::{load_test_items, TestItemLoad};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::context::ServiceContext;
use crate::diagnostics::{AuditError, LoadError};
use crate::model::{RequirementNode, SourceLocation};

use record::{parse_record, Parsed, Record};

/// Knobs for record discovery and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Directory names never descended into.
    pub skip_dirs: Vec<String>,
    /// File names ignored even when they have a YAML extension.
    pub skip_names: Vec<String>,
    /// Use the file stem as `uid` when a record has none.
    pub uid_from_file_stem: bool,
}

/// Requirements keyed by id, plus every per-file error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementLoad {
    /// Successfully loaded requirements.
    pub requirements: BTreeMap<String, RequirementNode>,
    /// Files that could not be loaded.
    pub errors: Vec<LoadError>,
}

/// Loads every requirement record under `dirs` (resolved against `root`).
///
/// A duplicate `uid` keeps the first record in discovery order and reports
/// the second.
///
/// # Errors
///
/// Returns an error only when a directory is missing or cannot be listed.
pub fn load_requirements(
    ctx: &ServiceContext,
    root: &Path,
    dirs: &[PathBuf],
    options: &LoadOptions,
) -> Result<RequirementLoad, AuditError> {
    let (records, errors) = load_records(ctx, root, dirs, options, "Requirement")?;

    let requirements: BTreeMap<String, RequirementNode> = records
        .into_iter()
        .map(|r| {
            let node = RequirementNode {
                id: r.uid.clone(),
                text: r.text,
                links: r.links,
                location: r.location,
            };
            (r.uid, node)
        })
        .collect();

    info!(loaded = requirements.len(), errors = errors.len(), "requirements loaded");
    Ok(RequirementLoad { requirements, errors })
}

/// Walks, parses, and de-duplicates records in discovery order.
fn load_records(
    ctx: &ServiceContext,
    root: &Path,
    dirs: &[PathBuf],
    options: &LoadOptions,
    label: &'static str,
) -> Result<(Vec<Record>, Vec<LoadError>), AuditError> {
    let files = discover(ctx, root, dirs, options, label)?;

    // Parsing is independent per file; the merge below stays sequential so
    // "first" in a duplicate pair always means first in path order.
    let parsed: Vec<Result<Parsed, LoadError>> =
        files.par_iter().map(|path| read_record(ctx, root, path, options)).collect();

    let mut seen: BTreeMap<String, SourceLocation> = BTreeMap::new();
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for outcome in parsed {
        match outcome {
            Ok(Parsed::Active(record)) => match seen.entry(record.uid.clone()) {
                Entry::Occupied(first) => errors.push(LoadError::DuplicateId {
                    id: record.uid,
                    first: first.get().clone(),
                    second: record.location,
                }),
                Entry::Vacant(slot) => {
                    slot.insert(record.location.clone());
                    records.push(record);
                }
            },
            Ok(Parsed::Inactive) => {}
            Err(err) => errors.push(err),
        }
    }
    Ok((records, errors))
}

/// Lists candidate record files across all directories, in directory order.
///
/// A file reachable from two overlapping directories is listed once.
fn discover(
    ctx: &ServiceContext,
    root: &Path,
    dirs: &[PathBuf],
    options: &LoadOptions,
    label: &'static str,
) -> Result<Vec<PathBuf>, AuditError> {
    let mut seen = BTreeSet::new();
    let mut files = Vec::new();
    for dir in dirs {
        let dir_path = root.join(dir);
        if !ctx.fs.is_dir(&dir_path) {
            return Err(AuditError::MissingInput { label, path: dir_path });
        }
        let found = ctx.fs.walk_files(&dir_path, &options.skip_dirs).map_err(|e| {
            AuditError::UnreadableInput { label, path: dir_path.clone(), message: e.to_string() }
        })?;
        files.extend(
            found
                .into_iter()
                .filter(|path| is_record_file(path, &options.skip_names))
                .filter(|path| seen.insert(path.clone())),
        );
    }
    Ok(files)
}

fn is_record_file(path: &Path, skip_names: &[String]) -> bool {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
    let skipped = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| skip_names.iter().any(|skip| skip == name));
    is_yaml && !skipped
}

fn read_record(
    ctx: &ServiceContext,
    root: &Path,
    path: &Path,
    options: &LoadOptions,
) -> Result<Parsed, LoadError> {
    let label = SourceLocation::relative_label(root, path);
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    let contents = ctx.fs.read_to_string(path).map_err(|e| LoadError::Unreadable {
        location: SourceLocation::file(label.clone()),
        message: e.to_string(),
    })?;
    debug!(path = %label, "parsing record");
    parse_record(&contents, &label, &stem, options.uid_from_file_stem)
}
