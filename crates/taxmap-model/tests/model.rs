//! Tests for taxmap-model types.

use std::collections::BTreeMap;

use taxmap_model::{
    Assignment, CorrectionRecord, ModelError, SampleData, SampleRow, SuggestionResponse,
    TargetField, TargetSchema, candidate_score,
};

fn row(pairs: &[(&str, &str)]) -> SampleRow {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn sample_data_rejects_duplicate_columns() {
    let err = SampleData::new(
        vec!["Date".to_string(), " Date ".to_string()],
        Vec::new(),
    )
    .unwrap_err();
    assert_eq!(err, ModelError::DuplicateColumn("Date".to_string()));
}

#[test]
fn sample_data_rejects_blank_columns() {
    let err = SampleData::new(vec!["Date".to_string(), "  ".to_string()], Vec::new())
        .unwrap_err();
    assert_eq!(err, ModelError::EmptyColumnName { index: 1 });
}

#[test]
fn values_for_skips_blank_cells() {
    let data = SampleData::new(
        vec!["Amount".to_string()],
        vec![
            row(&[("Amount", "10.00")]),
            row(&[("Amount", "")]),
            row(&[("Amount", "20.00")]),
            row(&[]),
            row(&[("Amount", "30.00")]),
            row(&[("Amount", "40.00")]),
        ],
    )
    .unwrap();
    assert_eq!(data.values_for("Amount", 3), vec!["10.00", "20.00", "30.00"]);
    assert_eq!(data.cell(3, "Amount"), "");
}

#[test]
fn suggestion_response_decodes_partial_payload() {
    let json = r#"{
        "mappings": {"Date": "date", "Amt": "amount"},
        "confidence": 0.82,
        "fieldConfidence": {"Date": 0.9},
        "candidates": {"Amt": [{"field": "amount", "confidence": 0.7}]}
    }"#;
    let response: SuggestionResponse = serde_json::from_str(json).expect("decode response");
    assert_eq!(response.mappings.len(), 2);
    assert!(response.unmapped.is_empty());
    assert!(response.conflicts.is_empty());
    assert_eq!(response.candidate_score("Amt", "amount"), Some(0.7));
    assert_eq!(response.candidate_score("Amt", "date"), None);
    assert_eq!(
        candidate_score(&response.candidates, "Amt", "amount"),
        response.candidate_score("Amt", "amount")
    );
}

#[test]
fn correction_record_uses_wire_tokens() {
    let record = CorrectionRecord {
        column: "Amt2".to_string(),
        old_target: Assignment::field("amount"),
        new_target: Assignment::Skip,
        sample_values: vec!["12.50".to_string()],
    };
    let value = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(value["oldTarget"], "amount");
    assert_eq!(value["newTarget"], "__skip__");
    assert_eq!(value["sampleValues"][0], "12.50");
}

#[test]
fn schema_groups_preserve_order() {
    let schema = TargetSchema::new(
        "vat_return",
        vec![
            TargetField::new("date", "Date").with_group("General"),
            TargetField::new("net_amount", "Net").with_group("Amounts"),
            TargetField::new("counterparty", "Counterparty").with_group("General"),
            TargetField::new("notes", "Notes"),
        ],
    );
    let groups = schema.grouped();
    let names: Vec<Option<&str>> = groups.iter().map(|(g, _)| *g).collect();
    assert_eq!(names, vec![Some("General"), Some("Amounts"), None]);
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(schema.label_for("net_amount"), "Net");
    assert_eq!(schema.label_for("missing"), "missing");
}

#[test]
fn assignment_map_roundtrips_through_json() {
    let mut map = BTreeMap::new();
    map.insert("Date".to_string(), Assignment::field("date"));
    map.insert("Memo".to_string(), Assignment::Skip);
    map.insert("Other".to_string(), Assignment::Unassigned);
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"Date":"date","Memo":"__skip__","Other":""}"#);
    let back: BTreeMap<String, Assignment> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}
