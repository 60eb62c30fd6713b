//! Identifier validation and list parsing.

use super::SourceLocation;

/// Characters that separate entries in an identifier list.
const LIST_DELIMITERS: [char; 2] = [',', ';'];

/// Returns `true` if `id` is usable as a node identifier.
///
/// Identifiers are opaque: they only need to be non-empty single tokens that
/// cannot be confused with a list delimiter.
#[must_use]
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && !id.chars().any(|c| c.is_whitespace() || c.is_control() || LIST_DELIMITERS.contains(&c))
}

/// Derives the identifier of an annotation that declares none.
///
/// The result is scoped to the block's location, so two blocks never derive
/// the same id.
#[must_use]
pub fn derive_test_id(location: &SourceLocation) -> String {
    match location.line {
        Some(line) => format!("{}#L{line}", location.path),
        None => location.path.clone(),
    }
}

/// Splits a delimiter-separated identifier list.
///
/// Empty entries (e.g. a trailing delimiter) are ignored and duplicates are
/// dropped, keeping first-seen order.
///
/// # Errors
///
/// Returns the first entry that is not a valid identifier.
pub fn split_identifier_list(value: &str) -> Result<Vec<String>, String> {
    let mut ids: Vec<String> = Vec::new();
    for entry in value.split(LIST_DELIMITERS).map(str::trim).filter(|e| !e.is_empty()) {
        if !is_valid_identifier(entry) {
            return Err(entry.to_string());
        }
        if !ids.iter().any(|existing| existing == entry) {
            ids.push(entry.to_string());
        }
    }
    Ok(ids)
}
