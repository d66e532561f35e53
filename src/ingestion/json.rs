//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object, read as one row
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested fields are addressed with dot paths in schema field names (e.g. `location.latitude`).
//! An absent field or a JSON `null` both become [`Value::Null`].

use std::fs;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Ingest a JSON file into an in-memory [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text, schema)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(mismatch("json input is empty".to_string()));
    }

    let records = match serde_json::from_str::<Json>(trimmed) {
        Ok(Json::Array(items)) => items,
        Ok(obj @ Json::Object(_)) => vec![obj],
        Ok(_) => {
            return Err(mismatch(
                "json must be an object, an array of objects, or NDJSON".to_string(),
            ));
        }
        Err(_) => parse_ndjson(trimmed)?,
    };

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (idx0, record) in records.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = record
            .as_object()
            .ok_or_else(|| mismatch(format!("row {row_num} is not a json object")))?;

        let row = schema
            .fields
            .iter()
            .map(|field| match lookup(obj, &field.name) {
                None | Some(Json::Null) => Ok(Value::Null),
                Some(v) => convert(row_num, &field.name, field.data_type, v),
            })
            .collect::<IngestionResult<Vec<_>>>()?;
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_ndjson(input: &str) -> IngestionResult<Vec<Json>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Json>(line.trim())
                .map_err(|e| mismatch(format!("invalid ndjson at line {}: {e}", i + 1)))
        })
        .collect()
}

fn mismatch(message: String) -> IngestionError {
    IngestionError::SchemaMismatch { message }
}

fn lookup<'a>(root: &'a Map<String, Json>, path: &str) -> Option<&'a Json> {
    if let Some(v) = root.get(path) {
        return Some(v);
    }
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn convert(row: usize, column: &str, data_type: DataType, v: &Json) -> IngestionResult<Value> {
    let parse_error = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match data_type {
        DataType::Utf8 => match v {
            Json::String(s) => Ok(Value::Utf8(s.clone())),
            // Facility codes are sometimes exported as bare numbers.
            Json::Number(n) => Ok(Value::Utf8(n.to_string())),
            _ => Err(parse_error("expected string")),
        },
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| parse_error("expected bool")),
        DataType::Int64 => match (v.as_i64(), v.as_f64()) {
            (Some(n), _) => Ok(Value::Int64(n)),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::Int64(f as i64)),
            _ => Err(parse_error("expected integer number")),
        },
        DataType::Float64 => v.as_f64().map(Value::Float64).ok_or_else(|| parse_error("expected number")),
    }
}
