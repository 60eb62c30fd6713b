//! Structured-comment dialect.
//!
//! A block is a contiguous run of lines such as
//!
//! ```text
//! # HODOR-ID: TST-STATUS-01
//! # HODOR-REQS: MON-001, MON-002
//! # HODOR-TEXT: Status output matches the schema
//! # HODOR-REF: tests/test_status.py::test_schema
//! ```
//!
//! behind any common comment leader. The first line that is not a marker
//! ends the block.

use crate::model::{is_valid_identifier, split_identifier_list, TestReference};

use super::{split_leader, BlockFields, ParsedBlock};

/// Recognised marker keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Id,
    Requirements,
    Text,
    Reference,
}

impl Directive {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "ID" => Some(Self::Id),
            "REQS" | "REQ" | "REQUIREMENTS" => Some(Self::Requirements),
            "TEXT" => Some(Self::Text),
            "REF" | "REFS" => Some(Self::Reference),
            _ => None,
        }
    }
}

/// Splits a marker line into its key and value.
///
/// Returns `None` for lines that are not `<prefix>-<KEY>: value`.
fn marker<'a>(line: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let body = split_leader(line).body;
    let rest = body.strip_prefix(prefix)?.strip_prefix('-')?;
    let key_len = rest
        .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let key = rest[..key_len].trim_end_matches('-');
    if key.is_empty() {
        return None;
    }
    let value = rest[key_len..].trim_start().strip_prefix(':')?.trim();
    let value = value.strip_suffix("*/").or_else(|| value.strip_suffix("-->")).unwrap_or(value);
    Some((key, value.trim_end()))
}

pub(super) fn is_marker(line: &str, prefix: &str) -> bool {
    marker(line, prefix).is_some()
}

/// Accumulates one block's directives.
#[derive(Debug, Default)]
struct CommentBlock {
    fields: BlockFields,
    text: Vec<String>,
}

impl CommentBlock {
    fn apply(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), String> {
        let directive =
            Directive::from_key(key).ok_or_else(|| format!("unknown directive `{prefix}-{key}`"))?;
        match directive {
            Directive::Id => {
                if !is_valid_identifier(value) {
                    return Err(format!("invalid test identifier `{value}`"));
                }
                match &self.fields.explicit_id {
                    Some(existing) if existing != value => {
                        return Err(format!("conflicting identifiers `{existing}` and `{value}`"));
                    }
                    _ => self.fields.explicit_id = Some(value.to_string()),
                }
            }
            Directive::Requirements => {
                let ids = split_identifier_list(value)
                    .map_err(|bad| format!("malformed requirement list entry `{bad}`"))?;
                for id in ids {
                    if !self.fields.requirement_refs.contains(&id) {
                        self.fields.requirement_refs.push(id);
                    }
                }
            }
            Directive::Text => {
                if !value.is_empty() {
                    self.text.push(value.to_string());
                }
            }
            Directive::Reference => {
                for entry in value.split([',', ';']).map(str::trim).filter(|e| !e.is_empty()) {
                    let reference = TestReference::parse(entry);
                    if !self.fields.references.contains(&reference) {
                        self.fields.references.push(reference);
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> BlockFields {
        if !self.text.is_empty() {
            self.fields.description = Some(self.text.join("\n"));
        }
        self.fields
    }
}

pub(super) fn parse_block(lines: &[&str], start: usize, prefix: &str) -> ParsedBlock {
    let mut block = CommentBlock::default();
    let mut problem: Option<String> = None;

    let mut end = start;
    while let Some((key, value)) = lines.get(end).and_then(|line| marker(line, prefix)) {
        end += 1;
        // Keep consuming after an error so the whole block is skipped as one.
        if problem.is_none() {
            if let Err(reason) = block.apply(prefix, key, value) {
                problem = Some(format!("{reason} (line {end})"));
            }
        }
    }

    let fields = match problem {
        Some(reason) => Err(reason),
        None => Ok(block.finish()),
    };
    ParsedBlock { end, fields }
}
