use facility_dashboard::ingestion::csv::{
    infer_csv_schema_from_path, ingest_csv_from_path, ingest_csv_from_reader, ingest_csv_inferred_from_path,
};
use facility_dashboard::types::{DataType, Field, Schema, Value};

const HEALTH_DATA: &str = "tests/fixtures/cleaned_health_data.xls";

fn facility_schema() -> Schema {
    Schema::new(vec![
        Field::new("health_facility", DataType::Utf8),
        Field::new("year", DataType::Int64),
        Field::new("agyw_population", DataType::Float64),
        Field::new("anc4_total", DataType::Int64),
    ])
}

#[test]
fn ingest_csv_from_path_happy_path() {
    let ds = ingest_csv_from_path(HEALTH_DATA, &facility_schema()).unwrap();

    assert_eq!(ds.row_count(), 7);
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Utf8("Bwera HC IV".to_string()),
            Value::Int64(2023),
            Value::Float64(1520.5),
            Value::Int64(22),
        ]
    );
    // Quoted field with an embedded comma.
    assert_eq!(ds.rows[5][0], Value::Utf8("Kasese Municipal HC III, Nyamwamba".to_string()));
    // Empty cells are missing.
    assert_eq!(ds.rows[6][2], Value::Null);
    assert_eq!(ds.rows[6][3], Value::Null);
}

#[test]
fn ingest_csv_allows_reordered_columns() {
    let input = "anc4_total,year,health_facility,agyw_population\n22,2023,Bwera HC IV,1520.5\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let ds = ingest_csv_from_reader(&mut rdr, &facility_schema()).unwrap();
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.rows[0][0], Value::Utf8("Bwera HC IV".to_string()));
    assert_eq!(ds.rows[0][3], Value::Int64(22));
}

#[test]
fn ingest_csv_errors_on_missing_required_column() {
    let input = "health_facility,year,agyw_population\nBwera HC IV,2023,1520.5\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &facility_schema()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("missing required column 'anc4_total'"));
}

#[test]
fn ingest_csv_errors_on_type_parse() {
    let input = "health_facility,year,agyw_population,anc4_total\nBwera HC IV,twenty,1520.5,22\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = ingest_csv_from_reader(&mut rdr, &facility_schema()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("failed to parse value at row 2"));
    assert!(msg.contains("column 'year'"));
}

#[test]
fn inferred_schema_of_health_data() {
    let schema = infer_csv_schema_from_path(HEALTH_DATA).unwrap();
    let field = |name: &str| {
        schema
            .fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.data_type)
            .unwrap()
    };

    assert_eq!(schema.fields.len(), 20);
    assert_eq!(field("subcountydivision"), DataType::Utf8);
    assert_eq!(field("year"), DataType::Int64);
    assert_eq!(field("month"), DataType::Utf8);
    assert_eq!(field("agyw_population"), DataType::Float64);
    assert_eq!(field("anc4_total"), DataType::Int64);
}

#[test]
fn inferred_ingestion_reads_numeric_months_and_missing_predictions() {
    let ds = ingest_csv_inferred_from_path("tests/fixtures/predicted_data.csv").unwrap();
    let month = ds.schema.index_of("month").unwrap();
    let anc = ds.schema.index_of("predicted_anc").unwrap();

    assert_eq!(ds.schema.fields[month].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[anc].data_type, DataType::Float64);
    assert_eq!(ds.rows[3][anc], Value::Null);
    assert_eq!(ds.rows[2][anc], Value::Float64(120.0));
}
