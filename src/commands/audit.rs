//! `goldthread audit` command.

use crate::audit::{build, write_artifacts};
use crate::config::AuditConfig;
use crate::context::ServiceContext;
use crate::report::format_summary;

use super::Outcome;

/// Execute the `audit` command.
///
/// Builds the classified graph, writes the report and orphan list, and
/// prints a summary. Orphans only fail the command under `strict`.
///
/// # Errors
///
/// Returns an error string if the audit could not run or an artifact could
/// not be written.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &AuditConfig,
    strict: bool,
) -> Result<Outcome, String> {
    let graph = build(ctx, config).map_err(|e| e.to_string())?;
    let written = write_artifacts(ctx, config, &graph).map_err(|e| e.to_string())?;

    println!("{}", format_summary(&graph));
    println!();
    println!("Wrote {}", written.report.display());
    println!("Wrote {}", written.orphans.display());

    if strict && !graph.is_clean() {
        return Ok(Outcome::IssuesFound);
    }
    Ok(Outcome::Success)
}
