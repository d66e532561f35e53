//! Column projection and renaming.

use std::collections::BTreeSet;

use crate::error::{QueryError, QueryResult};
use crate::types::{DataSet, Field, Schema};

/// Keep only `columns`, in the given order.
///
/// # Errors
///
/// [`QueryError::Schema`] if any column is absent; [`QueryError::DuplicateColumn`] if a column is
/// listed twice.
pub fn select<S: AsRef<str>>(dataset: &DataSet, columns: &[S]) -> QueryResult<DataSet> {
    let mut idxs = Vec::with_capacity(columns.len());
    let mut fields = Vec::with_capacity(columns.len());
    for name in columns {
        let (idx, field) = dataset.schema.require_field(name.as_ref())?;
        idxs.push(idx);
        fields.push(field.clone());
    }
    let schema = checked_schema(fields)?;

    Ok(dataset.map_rows(schema, |row| idxs.iter().map(|&i| row[i].clone()).collect()))
}

/// Rename columns. Each pair is `(from, to)`; columns not mentioned keep their names.
///
/// # Errors
///
/// [`QueryError::Schema`] if a `from` column is absent; [`QueryError::DuplicateColumn`] if the
/// result would contain two columns with the same name.
pub fn rename<S: AsRef<str>>(dataset: &DataSet, renames: &[(S, S)]) -> QueryResult<DataSet> {
    let mut fields = dataset.schema.fields.clone();
    for (from, to) in renames {
        let idx = dataset.schema.require_index(from.as_ref())?;
        fields[idx] = Field::new(to.as_ref(), fields[idx].data_type);
    }
    let schema = checked_schema(fields)?;
    Ok(DataSet::new(schema, dataset.rows.clone()))
}

fn checked_schema(fields: Vec<Field>) -> QueryResult<Schema> {
    let mut seen = BTreeSet::new();
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            return Err(QueryError::DuplicateColumn {
                column: field.name.clone(),
            });
        }
    }
    Ok(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::{rename, select};
    use crate::error::QueryError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("health_facility", DataType::Utf8),
            Field::new("month", DataType::Utf8),
            Field::new("anc1_total", DataType::Int64),
        ]);
        DataSet::new(
            schema,
            vec![vec![Value::Utf8("A".into()), Value::Utf8("Jan".into()), Value::Int64(4)]],
        )
    }

    #[test]
    fn select_reorders_and_drops_columns() {
        let out = select(&sample_dataset(), &["anc1_total", "health_facility"]).unwrap();
        assert_eq!(out.schema.field_names().collect::<Vec<_>>(), vec!["anc1_total", "health_facility"]);
        assert_eq!(out.rows[0], vec![Value::Int64(4), Value::Utf8("A".into())]);
    }

    #[test]
    fn select_unknown_column_is_a_schema_error() {
        let err = select(&sample_dataset(), &["anc4_total"]).unwrap_err();
        assert!(matches!(err, QueryError::Schema { ref column, .. } if column == "anc4_total"));
    }

    #[test]
    fn rename_keeps_types_and_rows() {
        let out = rename(&sample_dataset(), &[("health_facility", "Health Facility"), ("month", "Month")]).unwrap();
        assert_eq!(out.schema.fields[0], Field::new("Health Facility", DataType::Utf8));
        assert_eq!(out.schema.fields[1].name, "Month");
        assert_eq!(out.rows, sample_dataset().rows);
    }

    #[test]
    fn rename_into_existing_name_is_rejected() {
        let err = rename(&sample_dataset(), &[("month", "anc1_total")]).unwrap_err();
        assert_eq!(err, QueryError::DuplicateColumn { column: "anc1_total".to_string() });
    }
}
