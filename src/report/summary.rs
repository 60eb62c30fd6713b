//! Human-readable run summary.

use crate::trace::ClassifiedGraph;

use super::Summary;

/// Formats the summary table, the orphans, and the diagnostics of a run.
#[must_use]
pub fn format_summary(graph: &ClassifiedGraph) -> String {
    let summary = Summary::of(graph);
    let mut lines = Vec::new();

    let verdict = if summary.is_clean { "CLEAN" } else { "ISSUES FOUND" };
    lines.push(format!("Traceability: {verdict}"));
    lines.push(String::new());

    let rows = [
        (
            "requirements",
            summary.requirements.total,
            summary.requirements.satisfied,
            summary.requirements.orphaned,
            "-".to_string(),
        ),
        (
            "tests",
            summary.tests.total,
            summary.tests.satisfied,
            summary.tests.orphaned,
            summary.tests.broken.to_string(),
        ),
    ];
    lines.push(format!(
        "  {:<12}  {:>5}  {:>9}  {:>8}  {:>6}",
        "KIND", "TOTAL", "SATISFIED", "ORPHANED", "BROKEN"
    ));
    for (kind, total, satisfied, orphaned, broken) in &rows {
        lines.push(format!("  {kind:<12}  {total:>5}  {satisfied:>9}  {orphaned:>8}  {broken:>6}"));
    }
    lines.push(String::new());
    lines.push(format!(
        "Links: {} (declared: {}, design: {}, unresolved: {})",
        summary.links, summary.declared_links, summary.design_links, summary.unresolved
    ));
    lines.push(format!("Coverage: {:.1}%", summary.coverage_pct));

    let orphans: Vec<_> = graph.orphans().collect();
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("Orphans:".to_string());
        for node in orphans {
            let line = format!("  [{}] {} ({})", node.status, node.id, node.location);
            if node.missing_ids.is_empty() {
                lines.push(line);
            } else {
                lines.push(format!("{line} missing {}", node.missing_ids.join(", ")));
            }
        }
    }

    let diagnostics = graph.diagnostics();
    let warnings = graph.graph().warnings();
    if summary.diagnostics > 0 {
        lines.push(String::new());
        lines.push(format!("Diagnostics ({}):", summary.diagnostics));
        let messages = diagnostics
            .load_errors
            .iter()
            .map(ToString::to_string)
            .chain(diagnostics.scan_warnings.iter().map(ToString::to_string))
            .chain(warnings.iter().map(ToString::to_string));
        for message in messages {
            lines.push(format!("  - {message}"));
        }
    }

    lines.join("\n")
}
