//! Distinct values and de-duplication.

use std::collections::BTreeSet;

use super::aggregate::KeyValue;
use crate::error::QueryResult;
use crate::types::{DataSet, Value};

/// Sorted distinct non-missing values of `column`.
///
/// Used to populate selectors (subcounties, facilities, years, months).
pub fn distinct_values(dataset: &DataSet, column: &str) -> QueryResult<Vec<Value>> {
    let mut values: Vec<Value> = dataset
        .column(column)?
        .filter(|v| !v.is_missing())
        .cloned()
        .collect();
    values.sort_by(Value::total_cmp);
    values.dedup_by(|a, b| a.matches(b));
    Ok(values)
}

/// Keep the first row for each distinct combination of `subset` columns.
///
/// Missing values compare equal to each other, as do `-0.0` and `0.0`. Row order of the kept
/// rows is preserved.
pub fn drop_duplicates<S: AsRef<str>>(dataset: &DataSet, subset: &[S]) -> QueryResult<DataSet> {
    let idxs = subset
        .iter()
        .map(|name| dataset.schema.require_index(name.as_ref()))
        .collect::<QueryResult<Vec<_>>>()?;

    let mut seen: BTreeSet<Vec<KeyValue>> = BTreeSet::new();
    let rows = dataset
        .rows
        .iter()
        .filter(|row| seen.insert(idxs.iter().map(|&i| KeyValue(row[i].clone())).collect()))
        .cloned()
        .collect();
    Ok(DataSet::new(dataset.schema.clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::{distinct_values, drop_duplicates};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("subcountydivision", DataType::Utf8),
            Field::new("agyw_population", DataType::Float64),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Utf8("Hima".into()), Value::Float64(1200.0)],
                vec![Value::Utf8("Bwera".into()), Value::Float64(800.0)],
                vec![Value::Null, Value::Float64(1.0)],
                vec![Value::Utf8("Hima".into()), Value::Float64(1300.0)],
            ],
        )
    }

    #[test]
    fn distinct_values_are_sorted_and_skip_missing() {
        let values = distinct_values(&sample_dataset(), "subcountydivision").unwrap();
        assert_eq!(values, vec![Value::Utf8("Bwera".into()), Value::Utf8("Hima".into())]);
    }

    #[test]
    fn drop_duplicates_keeps_first_occurrence() {
        let out = drop_duplicates(&sample_dataset(), &["subcountydivision"]).unwrap();
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.rows[0][1], Value::Float64(1200.0));
    }

    #[test]
    fn drop_duplicates_over_many_rows_keeps_one_per_key_in_first_seen_order() {
        let schema = Schema::new(vec![
            Field::new("facility", DataType::Int64),
            Field::new("row", DataType::Int64),
        ]);
        let rows = (0..20_000_i64).map(|i| vec![Value::Int64((i * 7) % 500), Value::Int64(i)]).collect();
        let out = drop_duplicates(&DataSet::new(schema, rows), &["facility"]).unwrap();

        assert_eq!(out.row_count(), 500);
        let first_rows: Vec<i64> = out
            .rows
            .iter()
            .map(|r| match r[1] {
                Value::Int64(v) => v,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(first_rows, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn drop_duplicates_treats_signed_zeros_and_missing_as_equal() {
        let schema = Schema::new(vec![Field::new("x", DataType::Float64)]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::Float64(-0.0)],
                vec![Value::Null],
                vec![Value::Float64(0.0)],
                vec![Value::Float64(f64::NAN)],
            ],
        );
        let out = drop_duplicates(&ds, &["x"]).unwrap();
        assert_eq!(out.row_count(), 2);
        assert!(out.rows[1][0].is_missing());
    }

    #[test]
    fn unknown_column_is_rejected() {
        assert!(distinct_values(&sample_dataset(), "district").is_err());
        assert!(drop_duplicates(&sample_dataset(), &["district"]).is_err());
    }
}
