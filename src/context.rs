//! Building the template context.
//! The context is a JSON object assembled from a JSON or YAML document and
//! `KEY=VALUE` assignments given on the command line.

use std::io::Read;
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Parses a context document, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ContextError` if the content is neither, or isn't a mapping
pub fn parse_context(content: &str) -> Result<Map<String, Value>> {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ContextError(format!("Invalid context format: {}", e)))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        // `null` or an empty YAML document.
        Value::Null => Ok(Map::new()),
        other => Err(Error::ContextError(format!(
            "Context must be a mapping, got: {}",
            other
        ))),
    }
}

/// Reads and parses the context document at `path`.
pub fn load_context<P: AsRef<Path>>(path: P) -> Result<Map<String, Value>> {
    let path = path.as_ref();
    debug!("Loading context from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::ContextError(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    parse_context(&content)
}

/// Reads and parses a context document from `reader`.
pub fn read_context(mut reader: impl Read) -> Result<Map<String, Value>> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(Error::IoError)?;
    parse_context(&buf)
}

/// Splits a `KEY=VALUE` assignment on its first `=`.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), Value::String(value.to_string())))
        }
        _ => Err(Error::ContextError(format!(
            "Invalid assignment '{}', expected KEY=VALUE",
            assignment
        ))),
    }
}

/// Merges `documents` in order, then applies `assignments`. Later values win.
pub fn build_context<I, S>(documents: Vec<Map<String, Value>>, assignments: I) -> Result<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut context = Map::new();
    for document in documents {
        context.extend(document);
    }
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment.as_ref())?;
        context.insert(key, value);
    }
    Ok(Value::Object(context))
}
