//! Tab-separated orphan list for CI diffing.

use crate::trace::ClassifiedGraph;

/// Formats one line per node that is not satisfied:
/// `status<TAB>kind<TAB>id<TAB>location<TAB>missing-ids`.
///
/// Lines are sorted and newline-terminated; a clean graph yields an empty
/// string. Missing ids are comma-joined and the column is empty when there
/// are none.
#[must_use]
pub fn format_orphan_list(graph: &ClassifiedGraph) -> String {
    let mut lines: Vec<String> = graph
        .orphans()
        .map(|node| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                node.status,
                node.kind,
                node.id,
                node.location,
                node.missing_ids.join(",")
            )
        })
        .collect();
    lines.sort();
    lines.into_iter().map(|line| line + "\n").collect()
}
