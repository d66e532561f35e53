//! Overview page: how many facilities a set of subcounties has, and their AGYW population.

use crate::error::QueryResult;
use crate::processing::{
    aggregate, distinct_values, drop_duplicates, filter, map_column, select, Aggregate, AggregateSpec, Condition,
    FilterSpec,
};
use crate::query::QueryOutcome;
use crate::types::{DataSet, DataType, Value};

use super::columns::{AGYW_POPULATION, AUTHORITY, FACILITY, SUBCOUNTY};
use super::{labels, labels_in_order, whole};

/// Sorted subcounty names.
pub fn subcounties(dataset: &DataSet) -> QueryResult<Vec<String>> {
    distinct_values(dataset, SUBCOUNTY).map(labels)
}

/// Authority names (government, private not-for-profit, ...) in the order they first appear.
pub fn authorities(dataset: &DataSet) -> QueryResult<Vec<String>> {
    labels_in_order(dataset, AUTHORITY)
}

/// Subcounties with at least one facility run by `authority`, in data order.
pub fn subcounties_for_authority(dataset: &DataSet, authority: &str) -> QueryResult<Vec<String>> {
    let spec = FilterSpec::new().with(Condition::eq(AUTHORITY, authority));
    labels_in_order(&filter(dataset, &spec)?, SUBCOUNTY)
}

fn in_subcounties(selected: &[String]) -> FilterSpec {
    FilterSpec::new().with(Condition::is_in(SUBCOUNTY, selected.iter().map(String::as_str)))
}

/// Number of distinct facilities across the selected subcounties; zero when none are selected.
pub fn facility_count(dataset: &DataSet, selected: &[String]) -> QueryResult<usize> {
    if selected.is_empty() {
        return Ok(0);
    }
    let spec = AggregateSpec::new().with(Aggregate::count_distinct(FACILITY).alias("facilities"));
    let counted = aggregate(&filter(dataset, &in_subcounties(selected))?, &spec)?;
    // Without group-by columns the result is exactly one row.
    Ok(counted.rows.first().map_or(0, |row| whole(&row[0]).max(0) as usize))
}

/// AGYW population of each selected subcounty: its first record, as a whole number.
///
/// Nothing selected yields [`QueryOutcome::NotSubmitted`].
pub fn agyw_population(dataset: &DataSet, selected: &[String]) -> QueryResult<QueryOutcome> {
    if selected.is_empty() {
        return Ok(QueryOutcome::NotSubmitted);
    }
    let rows = filter(dataset, &in_subcounties(selected))?;
    let rows = select(&rows, &[SUBCOUNTY, AGYW_POPULATION])?;
    let rows = drop_duplicates(&rows, &[SUBCOUNTY])?;
    let rows = map_column(&rows, AGYW_POPULATION, DataType::Int64, |v| match v.as_f64() {
        Some(n) => Value::Int64(n as i64),
        None => Value::Null,
    })?;
    Ok(QueryOutcome::from_dataset(rows))
}

#[cfg(test)]
mod tests {
    use super::{agyw_population, authorities, facility_count, subcounties, subcounties_for_authority};
    use crate::dashboard::fixtures::health_data;
    use crate::error::QueryError;
    use crate::query::QueryOutcome;
    use crate::types::{DataType, Value};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selectors_list_sorted_names_without_missing() {
        let ds = health_data();
        assert_eq!(subcounties(&ds).unwrap(), names(&["Bwera", "Hima"]));
        assert_eq!(authorities(&ds).unwrap(), names(&["Govt", "PNFP"]));
        assert_eq!(subcounties_for_authority(&ds, "PNFP").unwrap(), names(&["Bwera"]));
        assert_eq!(subcounties_for_authority(&ds, "Govt").unwrap(), names(&["Bwera", "Hima"]));
    }

    #[test]
    fn authorities_keep_first_seen_order() {
        let mut ds = health_data();
        let pnfp = ds.rows.remove(2);
        ds.rows.insert(0, pnfp);
        assert_eq!(authorities(&ds).unwrap(), names(&["PNFP", "Govt"]));
    }

    #[test]
    fn facility_count_is_distinct_across_selection() {
        let ds = health_data();
        assert_eq!(facility_count(&ds, &names(&["Bwera"])).unwrap(), 2);
        assert_eq!(facility_count(&ds, &names(&["Bwera", "Hima"])).unwrap(), 3);
        assert_eq!(facility_count(&ds, &names(&["Nyamwamba"])).unwrap(), 0);
    }

    #[test]
    fn facility_count_without_selection_is_zero() {
        assert_eq!(facility_count(&health_data(), &[]).unwrap(), 0);
    }

    #[test]
    fn agyw_population_keeps_first_record_per_subcounty() {
        let ds = health_data();
        let outcome = agyw_population(&ds, &names(&["Hima", "Bwera"])).unwrap();
        let out = outcome.dataset().unwrap();

        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["subcountydivision", "agyw_population"]
        );
        assert_eq!(out.schema.fields[1].data_type, DataType::Int64);
        assert_eq!(
            out.rows,
            vec![
                vec![Value::from("Bwera"), Value::Int64(1520)],
                vec![Value::from("Hima"), Value::Int64(980)],
            ]
        );
    }

    #[test]
    fn agyw_population_distinguishes_no_selection_from_no_match() {
        let ds = health_data();
        assert_eq!(agyw_population(&ds, &[]).unwrap(), QueryOutcome::NotSubmitted);
        assert!(agyw_population(&ds, &names(&["Nyamwamba"])).unwrap().is_empty_result());
    }

    #[test]
    fn missing_subcounty_column_is_a_schema_error() {
        let ds = crate::dashboard::fixtures::predicted_data();
        let err = facility_count(&ds, &names(&["Bwera"])).unwrap_err();
        assert!(matches!(err, QueryError::Schema { ref column, .. } if column == "subcountydivision"));
    }
}
