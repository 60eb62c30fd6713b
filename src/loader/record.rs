//! Parsing of a single YAML item record.

use serde_yaml::{Mapping, Value};

use crate::diagnostics::LoadError;
use crate::model::{is_valid_identifier, split_identifier_list, SourceLocation, TestReference};

/// Fields shared by requirement records and test item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub uid: String,
    pub text: String,
    pub links: Vec<String>,
    pub location: SourceLocation,
}

/// Outcome of parsing a well-formed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Parsed {
    Active(Record),
    /// `active: false`; the item is retired and contributes nothing.
    Inactive,
}

/// Parses one record file.
///
/// `label` is the root-relative path used in locations; `stem` is the file
/// stem used as the uid when `uid_from_file_stem` is set and no `uid` is
/// present.
pub(crate) fn parse_record(
    contents: &str,
    label: &str,
    stem: &str,
    uid_from_file_stem: bool,
) -> Result<Parsed, LoadError> {
    let file = SourceLocation::file(label);
    let value: Value = serde_yaml::from_str(contents)
        .map_err(|e| LoadError::Unparsable { location: file.clone(), message: e.to_string() })?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        other => {
            return Err(LoadError::Unparsable {
                location: file,
                message: format!("expected a mapping, found {}", shape_name(&other)),
            })
        }
    };

    if matches!(mapping.get("active"), Some(Value::Bool(false))) {
        return Ok(Parsed::Inactive);
    }

    let (uid, location) = match required_scalar(&mapping, "uid", &file)? {
        Some(uid) => {
            let location = key_line(contents, "uid")
                .map_or_else(|| file.clone(), |line| SourceLocation::at(label, line));
            (uid, location)
        }
        None if uid_from_file_stem => (stem.to_string(), file.clone()),
        None => return Err(LoadError::MissingField { location: file, field: "uid" }),
    };
    if !is_valid_identifier(&uid) {
        return Err(LoadError::InvalidField {
            location,
            field: "uid",
            message: format!("`{uid}` is not a valid identifier"),
        });
    }

    let text = required_scalar(&mapping, "text", &location)?
        .map(|text| text.trim_end().to_string())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| LoadError::MissingField { location: location.clone(), field: "text" })?;

    let links = parse_links(mapping.get("links")).map_err(|message| LoadError::InvalidField {
        location: location.clone(),
        field: "links",
        message,
    })?;

    Ok(Parsed::Active(Record { uid, text, links, location }))
}

/// Reads an optional scalar field; non-scalar values are an error.
fn required_scalar(
    mapping: &Mapping,
    field: &'static str,
    location: &SourceLocation,
) -> Result<Option<String>, LoadError> {
    match mapping.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_string(value)
            .map(|s| (!s.trim().is_empty()).then_some(s))
            .ok_or_else(|| LoadError::InvalidField {
                location: location.clone(),
                field,
                message: format!("expected a string, found {}", shape_name(value)),
            }),
    }
}

/// Accepts a single id, a list of ids, or Doorstop's list of `{id: hash}`.
fn parse_links(value: Option<&Value>) -> Result<Vec<String>, String> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) => {
            return split_identifier_list(s).map_err(|bad| format!("`{bad}` is not a valid id"))
        }
        Some(Value::Sequence(items)) => items,
        Some(other) => return Err(format!("expected a list, found {}", shape_name(other))),
    };

    let mut links: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let id = match item {
            Value::Mapping(entry) if entry.len() == 1 => {
                entry.keys().next().and_then(scalar_string)
            }
            other => scalar_string(other),
        }
        .ok_or_else(|| format!("unsupported link entry ({})", shape_name(item)))?;

        if !is_valid_identifier(&id) {
            return Err(format!("`{id}` is not a valid id"));
        }
        if !links.contains(&id) {
            links.push(id);
        }
    }
    Ok(links)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "a scalar",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// 1-based line of a top-level `key:` entry.
fn key_line(contents: &str, key: &str) -> Option<usize> {
    contents
        .lines()
        .position(|line| {
            line.strip_prefix(key).is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
        .map(|index| index + 1)
}

/// Collects the bullet entries of a `References:` section in item text.
pub(crate) fn extract_references(text: &str) -> Vec<TestReference> {
    let mut refs = Vec::new();
    let mut lines = text.lines().map(str::trim);
    if lines.by_ref().any(|line| line == "References:") {
        for line in lines {
            let Some(entry) = line.strip_prefix("- ") else {
                break;
            };
            refs.push(TestReference::parse(entry.trim()));
        }
    }
    refs
}
