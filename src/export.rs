//! CSV export of a [`DataSet`].
//!
//! Output format:
//!
//! - a header row with the column names, then one row per record, comma separated;
//! - quoting follows the `csv` crate's minimal quoting (fields containing the delimiter, quotes
//!   or newlines are quoted);
//! - missing values (`Null`, `NaN`) are written as empty fields;
//! - integers and strings are written verbatim and read back unchanged by
//!   [`crate::ingestion::csv`], including surrounding whitespace, commas, quotes and newlines;
//! - the empty string is the one exception: CSV has no way to tell it from an empty field, so
//!   `Utf8("")` is written as an empty field and reads back as `Null`;
//! - floats use Rust's shortest round-trip representation (`0.1`, `2.5`, and `3` for `3.0`),
//!   so parsing the field as `f64` reproduces the exact value;
//! - booleans are written as `true`/`false`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::ExportResult;
use crate::types::DataSet;

/// Write `dataset` as CSV into `writer`.
pub fn write_csv<W: Write>(dataset: &DataSet, writer: W) -> ExportResult<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `dataset` as CSV into a file at `path`, replacing any existing file.
pub fn write_csv_to_path(dataset: &DataSet, path: impl AsRef<Path>) -> ExportResult<()> {
    let file = File::create(path)?;
    write_csv(dataset, file)
}

/// Render `dataset` as UTF-8 CSV bytes (what a download button serves).
pub fn to_csv_bytes(dataset: &DataSet) -> ExportResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(dataset, &mut buf)?;
    Ok(buf)
}

/// Render `dataset` as a CSV string.
pub fn to_csv_string(dataset: &DataSet) -> ExportResult<String> {
    let bytes = to_csv_bytes(dataset)?;
    // Every field was written from a Rust `String`, so the bytes are valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
