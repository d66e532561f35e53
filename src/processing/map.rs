//! Row and column mapping for [`crate::types::DataSet`].

use crate::error::QueryResult;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Returns a new [`DataSet`] by applying `mapper` to every row.
///
/// This is a convenience wrapper around [`DataSet::map_rows`] that keeps the schema.
///
/// # Panics
///
/// Panics if `mapper` returns rows with a different length than the schema field count.
pub fn map<F>(dataset: &DataSet, mapper: F) -> DataSet
where
    F: FnMut(&[Value]) -> Vec<Value>,
{
    dataset.map_rows(dataset.schema.clone(), mapper)
}

/// Replace one column by applying `f` to each of its values.
///
/// The column keeps its name and position but takes `data_type`; `f` is responsible for
/// producing values of that type (or `Null`).
///
/// # Errors
///
/// [`crate::QueryError::Schema`] if `column` is absent.
pub fn map_column<F>(dataset: &DataSet, column: &str, data_type: DataType, mut f: F) -> QueryResult<DataSet>
where
    F: FnMut(&Value) -> Value,
{
    let idx = dataset.schema.require_index(column)?;
    let mut fields = dataset.schema.fields.clone();
    fields[idx] = Field::new(column, data_type);

    Ok(dataset.map_rows(Schema::new(fields), |row| {
        let mut out = row.to_vec();
        out[idx] = f(&row[idx]);
        out
    }))
}
