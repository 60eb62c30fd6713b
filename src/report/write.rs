//! Write-then-rename output.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::context::ServiceContext;
use crate::diagnostics::AuditError;

/// Writes every `(path, contents)` pair to a sibling temporary file, then
/// renames each one over its target.
///
/// No target is touched until every temporary file has been written, so a
/// failed run leaves the previous set of artifacts in place. A reader never
/// sees a partially written artifact.
///
/// # Errors
///
/// Returns [`AuditError::Output`] naming the first artifact that failed.
pub fn write_atomic(ctx: &ServiceContext, artifacts: &[(&Path, &str)]) -> Result<(), AuditError> {
    let fail = |path: &Path| {
        let path = path.to_path_buf();
        move |e: Box<dyn std::error::Error + Send + Sync>| AuditError::Output {
            path,
            message: e.to_string(),
        }
    };

    for &(path, contents) in artifacts {
        ctx.fs.write(&temp_path(path), contents).map_err(fail(path))?;
    }
    for &(path, contents) in artifacts {
        ctx.fs.rename(&temp_path(path), path).map_err(fail(path))?;
        debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
