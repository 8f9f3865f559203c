//! End-to-end session flows against in-memory collaborators.

use std::collections::BTreeMap;

use taxmap_map::{
    ConfidenceBucket, CorrectionSink, MappingError, MappingSession, MemoryCorrectionSink,
    MemoryTemplateStore, RecordedSuggestions, ServiceError, SuggestionOutcome, SuggestionService,
    TemplateStore, template_from_store,
};
use taxmap_model::{
    Assignment, CorrectionRecord, FieldCandidate, MappingTemplate, SampleData, SampleRow,
    SuggestionRequest, SuggestionResponse,
};

const REPORT_TYPE: &str = "expense_report";

fn samples(columns: &[&str]) -> SampleData {
    let rows: Vec<SampleRow> = (0..6)
        .map(|i| {
            columns
                .iter()
                .map(|c| ((*c).to_string(), format!("{c}-{i}")))
                .collect()
        })
        .collect();
    SampleData::new(columns.iter().map(|c| (*c).to_string()).collect(), rows)
        .expect("valid sample data")
}

fn session(columns: &[&str]) -> MappingSession {
    let schema = taxmap_schema::schema_for(REPORT_TYPE).expect("expense schema");
    MappingSession::new(schema, samples(columns))
}

fn response(entries: &[(&str, &str, f64)]) -> SuggestionResponse {
    let mut response = SuggestionResponse {
        confidence: 0.75,
        ..SuggestionResponse::default()
    };
    for (column, field, score) in entries {
        response
            .mappings
            .insert((*column).to_string(), (*field).to_string());
        response
            .field_confidence
            .insert((*column).to_string(), *score);
        response.candidates.insert(
            (*column).to_string(),
            vec![FieldCandidate {
                field: (*field).to_string(),
                confidence: *score,
            }],
        );
    }
    response
}

struct FailingSupplier;

impl SuggestionService for FailingSupplier {
    async fn suggest_mapping(
        &self,
        _request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, ServiceError> {
        Err(ServiceError::Unavailable("connection refused".to_string()))
    }
}

struct BrokenTemplates;

impl TemplateStore for BrokenTemplates {
    async fn get_template(
        &self,
        _report_type: &str,
    ) -> Result<Option<MappingTemplate>, ServiceError> {
        Err(ServiceError::Rejected {
            status: 404,
            message: "no template".to_string(),
        })
    }

    async fn save_template(
        &self,
        _report_type: &str,
        _column_mappings: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable("timeout".to_string()))
    }
}

struct BrokenSink;

impl CorrectionSink for BrokenSink {
    async fn record_corrections(
        &self,
        _report_type: &str,
        _records: &[CorrectionRecord],
    ) -> Result<(), ServiceError> {
        Err(ServiceError::Unavailable("timeout".to_string()))
    }
}

#[tokio::test]
async fn conflicting_suggestion_resolved_and_confirmed() {
    let mut session = session(&["Date", "Amt", "Amt2"]);
    let supplier = RecordedSuggestions::new(response(&[
        ("Date", "date", 0.9),
        ("Amt", "amount", 0.7),
        ("Amt2", "amount", 0.65),
    ]));

    let outcome = session.request_suggestion(&supplier).await.unwrap();
    assert_eq!(outcome, SuggestionOutcome::Applied { applied: 3 });

    let conflicts = session.conflicts();
    assert_eq!(conflicts.count(), 1);
    assert_eq!(
        conflicts.columns_for("amount"),
        Some(&["Amt".to_string(), "Amt2".to_string()][..])
    );
    assert_eq!(
        session.proceed_to_preview().unwrap_err(),
        MappingError::UnresolvedConflicts { count: 1 }
    );

    let contenders = session.open_disambiguation("amount").unwrap();
    assert_eq!(contenders[0].column, "Amt");
    assert_eq!(contenders[0].score, Some(0.7));
    assert_eq!(contenders[1].sample_values[0], "Amt2-0");

    session.resolve_disambiguation("Amt").unwrap();

    assert_eq!(session.assignment("Date"), Some(&Assignment::field("date")));
    assert_eq!(session.assignment("Amt"), Some(&Assignment::field("amount")));
    assert_eq!(session.assignment("Amt2"), Some(&Assignment::Unassigned));
    assert_eq!(session.conflicts().count(), 0);
    assert_eq!(session.disambiguating(), None);

    let preview = session.proceed_to_preview().expect("preview allowed");
    assert_eq!(preview.columns.len(), 2);
    assert_eq!(preview.rows.len(), 5);

    let templates = MemoryTemplateStore::new();
    let sink = MemoryCorrectionSink::new();
    let confirmation = session.confirm(&templates, &sink).await.unwrap();

    assert_eq!(confirmation.corrections.len(), 1);
    let record = &confirmation.corrections[0];
    assert_eq!(record.column, "Amt2");
    assert_eq!(record.old_target, Assignment::field("amount"));
    assert_eq!(record.new_target, Assignment::Skip);
    assert_eq!(record.sample_values, vec!["Amt2-0", "Amt2-1", "Amt2-2"]);
    assert_eq!(sink.records(), confirmation.corrections);

    let saved = templates.get(REPORT_TYPE).expect("template saved");
    assert_eq!(saved.column_mappings.len(), 2);
    assert!(!saved.column_mappings.contains_key("Amt2"));
}

#[tokio::test]
async fn template_loaded_flag_requires_a_match() {
    let templates = MemoryTemplateStore::new();
    templates.insert(MappingTemplate::new(
        REPORT_TYPE,
        BTreeMap::from([
            ("Vendor Name".to_string(), "vendor".to_string()),
            ("Total".to_string(), "amount".to_string()),
        ]),
    ));

    let mut unrelated = session(&["Date", "Amt"]);
    assert_eq!(unrelated.load_template(&templates).await, 0);
    assert!(!unrelated.template_loaded());
    assert!(unrelated.store().iter().all(|(_, a)| *a == Assignment::Unassigned));

    let mut matching = session(&["Date", "Total", "Memo"]);
    assert_eq!(matching.load_template(&templates).await, 1);
    assert!(matching.template_loaded());
    assert_eq!(matching.assignment("Total"), Some(&Assignment::field("amount")));
    assert_eq!(matching.assignment("Date"), Some(&Assignment::Unassigned));
}

#[tokio::test]
async fn template_failures_are_silent() {
    let mut session = session(&["Date", "Amt"]);
    assert_eq!(session.load_template(&BrokenTemplates).await, 0);
    assert!(!session.template_loaded());

    session.set("Date", Assignment::field("date")).unwrap();
    let confirmation = session
        .confirm(&BrokenTemplates, &MemoryCorrectionSink::new())
        .await
        .expect("save failure does not block confirmation");
    assert!(!confirmation.template_saved);
}

#[tokio::test]
async fn unchanged_suggestion_emits_no_correction() {
    let mut session = session(&["Amount"]);
    let supplier = RecordedSuggestions::new(response(&[("Amount", "amount", 0.9)]));
    session.request_suggestion(&supplier).await.unwrap();

    let confirmation = session.prepare_confirmation().unwrap();
    assert!(confirmation.corrections.is_empty());
}

#[tokio::test]
async fn retargeted_column_emits_one_correction() {
    let mut session = session(&["Amount"]);
    let supplier = RecordedSuggestions::new(response(&[("Amount", "amount", 0.9)]));
    session.request_suggestion(&supplier).await.unwrap();
    session
        .set("Amount", Assignment::field("gross_amount"))
        .unwrap();

    let confirmation = session.prepare_confirmation().unwrap();
    assert_eq!(confirmation.corrections.len(), 1);
    assert_eq!(
        confirmation.corrections[0].old_target,
        Assignment::field("amount")
    );
    assert_eq!(
        confirmation.corrections[0].new_target,
        Assignment::field("gross_amount")
    );
}

#[tokio::test]
async fn cleared_column_emits_skip_correction() {
    let mut session = session(&["Date", "Amount"]);
    let supplier = RecordedSuggestions::new(response(&[
        ("Date", "date", 0.9),
        ("Amount", "amount", 0.9),
    ]));
    session.request_suggestion(&supplier).await.unwrap();
    session.set("Amount", Assignment::Unassigned).unwrap();

    let confirmation = session.prepare_confirmation().unwrap();
    assert_eq!(confirmation.corrections.len(), 1);
    assert_eq!(confirmation.corrections[0].column, "Amount");
    assert_eq!(confirmation.corrections[0].new_target, Assignment::Skip);
}

#[tokio::test]
async fn suggestion_for_absent_column_emits_no_correction() {
    let mut session = session(&["Date", "Amt"]);
    let supplier = RecordedSuggestions::new(response(&[
        ("Date", "date", 0.9),
        ("Ghost", "amount", 0.8),
    ]));
    session.request_suggestion(&supplier).await.unwrap();
    session.set("Amt", Assignment::field("amount")).unwrap();

    let confirmation = session.prepare_confirmation().unwrap();
    let columns: Vec<&str> = confirmation
        .corrections
        .iter()
        .map(|r| r.column.as_str())
        .collect();
    assert_eq!(columns, vec!["Amt"]);
    assert_eq!(
        confirmation.corrections[0].sample_values,
        vec!["Amt-0", "Amt-1", "Amt-2"]
    );
}

#[tokio::test]
async fn saved_template_is_the_extracted_template() {
    let mut session = session(&["Date", "Amount", "Memo", "Notes"]);
    session.set("Date", Assignment::field("date")).unwrap();
    session.set("Amount", Assignment::field("amount")).unwrap();
    session.set("Memo", Assignment::Skip).unwrap();

    let templates = MemoryTemplateStore::new();
    let confirmation = session
        .confirm(&templates, &MemoryCorrectionSink::new())
        .await
        .unwrap();

    let expected = template_from_store(REPORT_TYPE, session.store());
    assert_eq!(confirmation.mappings, expected.column_mappings);
    assert_eq!(templates.get(REPORT_TYPE), Some(expected));
}

#[tokio::test]
async fn manual_only_session_emits_no_corrections() {
    let mut session = session(&["Date", "Amount", "Memo"]);
    session.set("Date", Assignment::field("date")).unwrap();
    session.set("Amount", Assignment::field("amount")).unwrap();
    session.set("Memo", Assignment::Skip).unwrap();

    let sink = MemoryCorrectionSink::new();
    let confirmation = session
        .confirm(&MemoryTemplateStore::new(), &sink)
        .await
        .unwrap();

    assert!(confirmation.corrections.is_empty());
    assert!(sink.batches().is_empty());
    assert!(confirmation.corrections_delivered);
}

#[tokio::test]
async fn supplier_failure_keeps_assignment() {
    let mut session = session(&["Date", "Amount"]);
    session.set("Date", Assignment::field("date")).unwrap();
    let before = session.store().clone();

    let err = session.request_suggestion(&FailingSupplier).await.unwrap_err();

    assert!(matches!(err, MappingError::SuggestionFailed(_)));
    assert!(err.user_message().contains("Automatic mapping is unavailable"));
    assert_eq!(session.store(), &before);
    assert!(!session.has_suggestion());
    assert_eq!(session.confidence_bucket(), None);
}

#[tokio::test]
async fn correction_delivery_failure_does_not_block() {
    let mut session = session(&["Amount"]);
    let supplier = RecordedSuggestions::new(response(&[("Amount", "amount", 0.9)]));
    session.request_suggestion(&supplier).await.unwrap();
    session.set("Amount", Assignment::field("gross_amount")).unwrap();

    let templates = MemoryTemplateStore::new();
    let confirmation = session.confirm(&templates, &BrokenSink).await.unwrap();

    assert_eq!(confirmation.corrections.len(), 1);
    assert!(!confirmation.corrections_delivered);
    assert!(confirmation.template_saved);
}

#[test]
fn stale_suggestion_is_discarded() {
    let mut session = session(&["Date", "Amount"]);
    let first = session.begin_suggestion();
    let second = session.begin_suggestion();

    let applied = session
        .finish_suggestion(&second, Ok(response(&[("Amount", "amount", 0.9)])))
        .unwrap();
    assert_eq!(applied, SuggestionOutcome::Applied { applied: 1 });

    session.set("Date", Assignment::field("date")).unwrap();
    let late_response = response(&[("Amount", "gross_amount", 0.9), ("Date", "vendor", 0.5)]);
    let late = session.finish_suggestion(&first, Ok(late_response)).unwrap();

    assert_eq!(late, SuggestionOutcome::Stale { seq: 1, latest: 2 });
    assert_eq!(session.assignment("Amount"), Some(&Assignment::field("amount")));
    assert_eq!(session.assignment("Date"), Some(&Assignment::field("date")));
}

#[test]
fn stale_failure_is_not_surfaced() {
    let mut session = session(&["Date"]);
    let first = session.begin_suggestion();
    let _second = session.begin_suggestion();
    let outcome = session
        .finish_suggestion(&first, Err(ServiceError::Unavailable("late".to_string())))
        .unwrap();
    assert!(matches!(outcome, SuggestionOutcome::Stale { .. }));
}

#[test]
fn suggestion_request_carries_upload_context() {
    let mut session = session(&["Date", "Amount"]);
    let ticket = session.begin_suggestion();
    let request = ticket.request();
    assert_eq!(request.report_type, REPORT_TYPE);
    assert_eq!(request.columns, vec!["Date".to_string(), "Amount".to_string()]);
    assert_eq!(request.sample_rows.len(), 5);
}

#[tokio::test]
async fn later_template_overrides_suggestion() {
    let mut session = session(&["Total", "Date"]);
    let supplier = RecordedSuggestions::new(response(&[("Total", "gross_amount", 0.8)]));
    session.request_suggestion(&supplier).await.unwrap();

    let templates = MemoryTemplateStore::new();
    templates.insert(MappingTemplate::new(
        REPORT_TYPE,
        BTreeMap::from([("Total".to_string(), "amount".to_string())]),
    ));
    session.load_template(&templates).await;

    assert_eq!(session.assignment("Total"), Some(&Assignment::field("amount")));
}

#[tokio::test]
async fn low_confidence_columns_are_flagged() {
    let mut session = session(&["Date", "Amount", "Memo"]);
    assert!(session.view().low_confidence.is_empty());

    let supplier = RecordedSuggestions::new(response(&[
        ("Date", "date", 0.95),
        ("Amount", "amount", 0.4),
    ]));
    session.request_suggestion(&supplier).await.unwrap();

    let view = session.view();
    assert_eq!(
        view.low_confidence.into_iter().collect::<Vec<_>>(),
        vec!["Amount".to_string()]
    );
    assert!(!session.is_low_confidence("Memo"));
    assert_eq!(view.confidence, Some(ConfidenceBucket::Medium));
}

#[test]
fn confirm_requires_a_mapping() {
    let mut session = session(&["Date", "Memo"]);
    session.set("Memo", Assignment::Skip).unwrap();
    let err = session.prepare_confirmation().unwrap_err();
    assert_eq!(err, MappingError::NothingMapped);
    assert!(err.is_validation());
}

#[test]
fn set_rejects_unknown_column() {
    let mut session = session(&["Date"]);
    let err = session.set("Nope", Assignment::Skip).unwrap_err();
    assert_eq!(err.column(), Some("Nope"));
    assert_eq!(session.store().len(), 1);
}

#[test]
fn unmapped_fields_follow_schema_order() {
    let mut session = session(&["Date", "Amount"]);
    session.set("Date", Assignment::field("date")).unwrap();
    session.set("Amount", Assignment::field("amount")).unwrap();
    let unmapped = session.unmapped_fields();
    assert_eq!(unmapped.first(), Some(&"vendor"));
    assert!(!unmapped.contains(&"date"));
}
