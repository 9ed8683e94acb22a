//! Decoder implementations

use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;
use std::fs;
use std::path::Path;

// ============================================================================
// JSONL Decoder
// ============================================================================

/// JSON Lines decoder (one JSON object per line)
#[derive(Debug, Clone, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a file body into records, preserving file order
    ///
    /// `path` is only used to point errors at the offending file.
    pub fn decode(&self, path: &Path, body: &str) -> Result<Vec<JsonObject>> {
        let mut records = Vec::new();

        for (line_num, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: Value = serde_json::from_str(line)
                .map_err(|e| Error::parse_line(path, line_num + 1, e.to_string()))?;

            match value {
                Value::Object(record) => records.push(record),
                other => {
                    return Err(Error::parse_line(
                        path,
                        line_num + 1,
                        format!("expected a JSON object, found {}", json_kind(&other)),
                    ))
                }
            }
        }

        Ok(records)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Record Source
// ============================================================================

/// Reads one record file from disk
#[derive(Debug, Clone, Default)]
pub struct RecordSource {
    decoder: JsonlDecoder,
}

impl RecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode every record of a file, in file order
    ///
    /// An unreadable file is reported as a parse error for that file.
    pub fn read(&self, path: &Path) -> Result<Vec<JsonObject>> {
        let body = fs::read_to_string(path)
            .map_err(|e| Error::parse(path, format!("unreadable file: {e}")))?;

        let records = self.decoder.decode(path, &body)?;
        tracing::debug!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    /// Read a file that must hold exactly one record
    pub fn read_single(&self, path: &Path) -> Result<JsonObject> {
        let mut records = self.read(path)?;
        match records.len() {
            1 => Ok(records.remove(0)),
            0 => Err(Error::parse(path, "file contains no records")),
            n => Err(Error::parse(
                path,
                format!("expected exactly one record, found {n}"),
            )),
        }
    }
}
