//! `goldthread check` command.

use crate::audit::build;
use crate::cli::CheckFormat;
use crate::config::AuditConfig;
use crate::context::ServiceContext;
use crate::report::{format_orphan_list, graph_json};
use crate::trace::ClassifiedGraph;

use super::Outcome;

/// Execute the `check` command.
///
/// Prints the orphan list or the classified graph and writes nothing.
///
/// # Errors
///
/// Returns an error string if the audit could not run.
pub fn run_with_context(
    ctx: &ServiceContext,
    config: &AuditConfig,
    format: CheckFormat,
) -> Result<Outcome, String> {
    let graph = build(ctx, config).map_err(|e| e.to_string())?;
    let output = render(&graph, format)?;
    print!("{output}");

    if graph.is_clean() {
        Ok(Outcome::Success)
    } else {
        Ok(Outcome::IssuesFound)
    }
}

fn render(graph: &ClassifiedGraph, format: CheckFormat) -> Result<String, String> {
    match format {
        CheckFormat::Text => Ok(format_orphan_list(graph)),
        CheckFormat::Json => {
            graph_json(graph).map_err(|e| format!("Failed to serialize graph: {e}"))
        }
    }
}
