//! CSV ingestion implementation.
//!
//! Two entry styles:
//!
//! - schema-first ([`ingest_csv_from_path`]): the caller names the columns and their types;
//! - inferred ([`ingest_csv_inferred_from_path`]): the schema is derived from the header and
//!   the cell values, the way the facility exports are usually consumed.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ).
/// - Each value is parsed according to the schema field type.
/// - Text cells are kept exactly as written, surrounding whitespace included. Numeric and bool
///   cells are trimmed before parsing.
/// - An empty cell is `Null` in every column type, as is a whitespace-only numeric or bool cell.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    build_dataset(&headers, &records, schema)
}

/// Ingest a CSV file, inferring the schema from its contents.
///
/// See [`infer_schema`] for the inference rules.
pub fn ingest_csv_inferred_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_inferred_from_reader(&mut rdr)
}

/// Ingest CSV data from a reader, inferring the schema from its contents.
pub fn ingest_csv_inferred_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    let schema = infer_schema(&headers, &records)?;
    build_dataset(&headers, &records, &schema)
}

/// Infer a schema for the columns of a CSV file without keeping its rows.
pub fn infer_csv_schema_from_path(path: impl AsRef<Path>) -> IngestionResult<Schema> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    infer_schema(&headers, &records)
}

/// Infer column types from every non-empty cell:
///
/// - `Int64` if all parse as integers;
/// - otherwise `Float64` if all parse as floats;
/// - otherwise `Bool` if all are `true`/`false` (any case);
/// - otherwise `Utf8`.
///
/// A column with no non-empty cells is `Float64` (an all-missing numeric column).
/// Duplicate header names are rejected.
pub fn infer_schema(headers: &csv::StringRecord, records: &[csv::StringRecord]) -> IngestionResult<Schema> {
    let mut fields: Vec<Field> = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        if fields.iter().any(|f| f.name == name) {
            return Err(IngestionError::SchemaMismatch {
                message: format!("duplicate column '{name}' in csv header"),
            });
        }

        let mut candidate = Candidate::default();
        for record in records {
            let cell = record.get(idx).unwrap_or("").trim();
            if !cell.is_empty() {
                candidate.observe(cell);
            }
        }
        fields.push(Field::new(name, candidate.data_type()));
    }
    Ok(Schema::new(fields))
}

#[derive(Debug)]
struct Candidate {
    seen: bool,
    int: bool,
    float: bool,
    boolean: bool,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            seen: false,
            int: true,
            float: true,
            boolean: true,
        }
    }
}

impl Candidate {
    fn observe(&mut self, cell: &str) {
        self.seen = true;
        self.int = self.int && cell.parse::<i64>().is_ok();
        self.float = self.float && cell.parse::<f64>().is_ok();
        self.boolean = self.boolean && (cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false"));
    }

    fn data_type(&self) -> DataType {
        if !self.seen {
            DataType::Float64
        } else if self.int {
            DataType::Int64
        } else if self.float {
            DataType::Float64
        } else if self.boolean {
            DataType::Bool
        } else {
            DataType::Utf8
        }
    }
}

fn build_dataset(
    headers: &csv::StringRecord,
    records: &[csv::StringRecord],
    schema: &Schema,
) -> IngestionResult<DataSet> {
    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();

    let parse_error = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        // Text is kept verbatim; only an empty cell is missing.
        DataType::Utf8 if raw.is_empty() => Ok(Value::Null),
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        _ if trimmed.is_empty() => Ok(Value::Null),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{ingest_csv_from_reader, ingest_csv_inferred_from_reader};
    use crate::types::{DataType, Field, Schema, Value};

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    #[test]
    fn infers_int_float_bool_and_text_columns() {
        let input = "health_facility,year,predicted_anc,latitude,active\n\
                     Bwera HC IV,2023,12,0.13,true\n\
                     Kagando Hospital,2023,,0.2,FALSE\n";
        let ds = ingest_csv_inferred_from_reader(&mut reader(input)).unwrap();

        assert_eq!(
            ds.schema.fields,
            vec![
                Field::new("health_facility", DataType::Utf8),
                Field::new("year", DataType::Int64),
                Field::new("predicted_anc", DataType::Int64),
                Field::new("latitude", DataType::Float64),
                Field::new("active", DataType::Bool),
            ]
        );
        assert_eq!(ds.rows[1][2], Value::Null);
        assert_eq!(ds.rows[1][4], Value::Bool(false));
    }

    #[test]
    fn mixed_int_and_float_becomes_float() {
        let ds = ingest_csv_inferred_from_reader(&mut reader("x\n1\n2.5\n")).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(ds.rows[0][0], Value::Float64(1.0));
    }

    #[test]
    fn all_empty_column_is_float() {
        let ds = ingest_csv_inferred_from_reader(&mut reader("x,y\n,a\n,b\n")).unwrap();
        assert_eq!(ds.schema.fields[0].data_type, DataType::Float64);
        assert_eq!(ds.rows[0][0], Value::Null);
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = ingest_csv_inferred_from_reader(&mut reader("x,x\n1,2\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'x'"));
    }

    #[test]
    fn text_keeps_surrounding_whitespace_and_numbers_are_trimmed() {
        let schema = Schema::new(vec![
            Field::new("subcountydivision", DataType::Utf8),
            Field::new("deliveries_total", DataType::Int64),
        ]);
        let input = "subcountydivision,deliveries_total\n Bwera , 35 \n,\n\" \",  \n";
        let ds = ingest_csv_from_reader(&mut reader(input), &schema).unwrap();
        assert_eq!(
            ds.rows,
            vec![
                vec![Value::Utf8(" Bwera ".into()), Value::Int64(35)],
                vec![Value::Null, Value::Null],
                vec![Value::Utf8(" ".into()), Value::Null],
            ]
        );
    }
}
