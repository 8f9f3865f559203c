//! Learning signal: how the confirmed mapping diverged from the AI suggestion.

use std::collections::BTreeMap;

use tracing::{info, warn};

use taxmap_model::{Assignment, CorrectionRecord, SampleData};

use crate::service::CorrectionSink;

/// Representative sample values attached to each correction.
pub const CORRECTION_SAMPLE_LIMIT: usize = 3;

/// Compare the AI suggestion with the confirmed mapping.
///
/// `suggested` is the supplier's mapping exactly as returned, or `None` when
/// no suggestion was ever applied in this session, in which case nothing is
/// emitted. `confirmed` holds only real target fields. A column missing from
/// either side counts as skipped on that side. Only upload columns are
/// compared, in upload order; suggested keys naming absent columns are ignored.
pub fn generate_corrections(
    suggested: Option<&BTreeMap<String, String>>,
    confirmed: &BTreeMap<String, String>,
    samples: &SampleData,
) -> Vec<CorrectionRecord> {
    let Some(suggested) = suggested else {
        return Vec::new();
    };

    samples
        .columns()
        .iter()
        .filter_map(|column| {
            let old_target = resolve(suggested.get(column));
            let new_target = resolve(confirmed.get(column));
            (old_target != new_target).then(|| CorrectionRecord {
                column: column.clone(),
                old_target,
                new_target,
                sample_values: samples
                    .values_for(column, CORRECTION_SAMPLE_LIMIT)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
        })
        .collect()
}

fn resolve(raw: Option<&String>) -> Assignment {
    raw.map_or(Assignment::Skip, |value| Assignment::from_wire(value).resolved())
}

/// Deliver corrections, swallowing failures. Returns whether delivery succeeded.
pub async fn deliver_corrections<C: CorrectionSink>(
    sink: &C,
    report_type: &str,
    records: &[CorrectionRecord],
) -> bool {
    if records.is_empty() {
        return true;
    }
    match sink.record_corrections(report_type, records).await {
        Ok(()) => {
            info!(report_type, count = records.len(), "corrections recorded");
            true
        }
        Err(error) => {
            warn!(report_type, %error, "correction delivery failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(columns: &[&str]) -> SampleData {
        SampleData::new(columns.iter().map(|c| (*c).to_string()).collect(), Vec::new())
            .expect("valid header")
    }

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
            .collect()
    }

    #[test]
    fn unchanged_column_emits_nothing() {
        let ai = map(&[("Amount", "amount")]);
        let records = generate_corrections(
            Some(&ai),
            &map(&[("Amount", "amount")]),
            &upload(&["Amount"]),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn changed_target_emits_old_and_new() {
        let ai = map(&[("Amount", "amount")]);
        let records = generate_corrections(
            Some(&ai),
            &map(&[("Amount", "gross_amount")]),
            &upload(&["Amount"]),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].old_target, Assignment::field("amount"));
        assert_eq!(records[0].new_target, Assignment::field("gross_amount"));
    }

    #[test]
    fn cleared_column_becomes_skip() {
        let ai = map(&[("Amount", "amount")]);
        let records = generate_corrections(Some(&ai), &BTreeMap::new(), &upload(&["Amount"]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].new_target, Assignment::Skip);
    }

    #[test]
    fn column_added_by_user_is_reported() {
        let ai = map(&[("Date", "date")]);
        let records = generate_corrections(
            Some(&ai),
            &map(&[("Date", "date"), ("Memo", "description")]),
            &upload(&["Date", "Memo"]),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].column, "Memo");
        assert_eq!(records[0].old_target, Assignment::Skip);
    }

    #[test]
    fn ai_skip_token_matches_absent_final() {
        let ai = map(&[("Memo", "__skip__"), ("Other", "")]);
        let records = generate_corrections(
            Some(&ai),
            &BTreeMap::new(),
            &upload(&["Memo", "Other"]),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn no_suggestion_means_no_records() {
        let records = generate_corrections(
            None,
            &map(&[("Amount", "amount")]),
            &upload(&["Amount"]),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn suggested_column_missing_from_upload_is_ignored() {
        let ai = map(&[("Date", "date"), ("Ghost", "amount")]);
        let records = generate_corrections(
            Some(&ai),
            &map(&[("Date", "date"), ("Amt", "amount")]),
            &upload(&["Date", "Amt"]),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].column, "Amt");
        assert_eq!(records[0].old_target, Assignment::Skip);
    }

    #[test]
    fn records_follow_upload_order() {
        let ai = map(&[("Amount", "amount"), ("Date", "date")]);
        let records = generate_corrections(
            Some(&ai),
            &BTreeMap::new(),
            &upload(&["Date", "Amount"]),
        );
        let columns: Vec<&str> = records.iter().map(|r| r.column.as_str()).collect();
        assert_eq!(columns, vec!["Date", "Amount"]);
    }
}
