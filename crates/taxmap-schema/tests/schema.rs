use std::io::Write;

use taxmap_schema::{SchemaError, load, load_from_path, schema_for};

#[test]
fn embedded_schemas_load() {
    let schemas = load().expect("load embedded schemas");
    let types: Vec<&str> = schemas.iter().map(|s| s.report_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["expense_report", "income_statement", "payroll", "vat_return"]
    );
    assert!(schemas.iter().all(|s| !s.fields.is_empty()));
}

#[test]
fn vat_return_fields_are_ordered() {
    let schema = schema_for("VAT_RETURN").expect("vat schema");
    assert_eq!(schema.report_type, "vat_return");
    assert_eq!(schema.fields.first().map(|f| f.key.as_str()), Some("date"));
    assert_eq!(schema.fields.last().map(|f| f.key.as_str()), Some("currency"));
    assert!(schema.contains("vat_amount"));
}

#[test]
fn unknown_report_type_is_an_error() {
    let err = schema_for("crypto_gains").unwrap_err();
    assert!(matches!(err, SchemaError::UnknownReportType(ref t) if t == "crypto_gains"));
}

#[test]
fn override_file_is_read_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "Report Type,Field Order,Field Key,Field Label,Group").unwrap();
    writeln!(file, "custom,1,amount,Amount,Amounts").unwrap();
    writeln!(file, "custom,2,memo,Memo,").unwrap();
    file.flush().unwrap();

    let schemas = load_from_path(file.path()).expect("load override");
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0].report_type, "custom");
    assert_eq!(schemas[0].fields.len(), 2);
}

#[test]
fn missing_override_file_reports_path() {
    let err = load_from_path(std::path::Path::new("/nonexistent/fields.csv")).unwrap_err();
    assert!(matches!(err, SchemaError::CsvRead { .. }));
}
