//! Docstring-block dialect.
//!
//! A labelled section inside a documentation block, followed by a deeper
//! indented list of requirement ids:
//!
//! ```text
//! def test_status():
//!     """Status output is schema shaped.
//!
//!     Requirements:
//!         - MON-002
//!         - MON-003
//!     """
//! ```
//!
//! The same shape works behind a line-comment leader (`///`, `#`, ...) as
//! long as every entry carries the header's leader. Blocks in this dialect
//! have no id field; the node id is always derived from the block location.

use crate::model::{is_valid_identifier, TestReference};

use super::{split_leader, BlockFields, ParsedBlock};

/// Keywords that may precede an item keyword on a definition line.
const QUALIFIERS: [&str; 8] =
    ["pub(crate)", "pub(super)", "pub", "async", "export", "unsafe", "const", "extern"];

/// Keywords that introduce a named test item.
const ITEM_KEYWORDS: [&str; 4] = ["def", "fn", "function", "class"];

pub(super) fn is_header(line: &str, labels: &[String]) -> bool {
    let body = split_leader(line).body;
    labels.iter().any(|label| label == body)
}

pub(super) fn parse_block(lines: &[&str], start: usize, label: &str) -> ParsedBlock {
    let header = split_leader(lines[start]);

    let mut fields = BlockFields::default();
    let mut end = start + 1;
    while let Some((column, body)) = lines.get(end).and_then(|line| entry(line, header.leader)) {
        if body.is_empty() || column <= header.column {
            break;
        }
        end += 1;
        let id = body
            .strip_prefix("- ")
            .or_else(|| body.strip_prefix("* "))
            .map_or(body, str::trim_start);
        if !is_valid_identifier(id) {
            return ParsedBlock {
                end: skip_rest(lines, end, header.leader, header.column),
                fields: Err(format!("invalid requirement entry `{body}` (line {end})")),
            };
        }
        if !fields.requirement_refs.iter().any(|existing| existing == id) {
            fields.requirement_refs.push(id.to_string());
        }
    }

    let name = if header.leader.is_empty() {
        enclosing_item(lines, start)
    } else {
        following_item(lines, end)
    };
    fields.references = vec![TestReference { path: label.to_string(), name }];
    ParsedBlock { end, fields: Ok(fields) }
}

/// Splits a candidate entry line into its body column and trimmed body.
///
/// Returns `None` when the line does not carry `leader`.
fn entry<'a>(line: &'a str, leader: &str) -> Option<(usize, &'a str)> {
    let rest = line.trim_start().strip_prefix(leader)?;
    let body = rest.trim_start();
    Some((line.len() - body.len(), body.trim_end()))
}

fn skip_rest(lines: &[&str], mut end: usize, leader: &str, column: usize) -> usize {
    while lines
        .get(end)
        .and_then(|line| entry(line, leader))
        .is_some_and(|(col, body)| !body.is_empty() && col > column)
    {
        end += 1;
    }
    end
}

/// Name of the nearest definition above `start` (the docstring's owner).
fn enclosing_item(lines: &[&str], start: usize) -> Option<String> {
    lines[..start].iter().rev().find_map(|line| item_name(line))
}

/// Name of the first definition at or after `from`, skipping comments,
/// attributes, decorators and blank lines.
fn following_item(lines: &[&str], from: usize) -> Option<String> {
    for line in lines.iter().skip(from) {
        let trimmed = line.trim_start();
        let skippable = trimmed.is_empty()
            || ["//", "/*", "*", "#", "@", "--"].iter().any(|p| trimmed.starts_with(p));
        if skippable {
            continue;
        }
        return item_name(line);
    }
    None
}

/// Parses `def name`, `pub async fn name`, `function name` and the like.
fn item_name(line: &str) -> Option<String> {
    let mut rest = line.trim_start();
    while let Some(stripped) = QUALIFIERS.iter().find_map(|q| strip_word(rest, q)) {
        rest = stripped;
    }
    let rest = ITEM_KEYWORDS.iter().find_map(|k| strip_word(rest, k))?;
    let name: String =
        rest.chars().take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$').collect();
    (!name.is_empty()).then_some(name)
}

/// Strips `word` plus following whitespace, requiring at least one space.
fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    let trimmed = rest.trim_start();
    (trimmed.len() < rest.len()).then_some(trimmed)
}
