//! Applying and extracting per-report-type mapping templates.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use taxmap_model::{Assignment, MappingTemplate};

use crate::service::TemplateStore;
use crate::store::AssignmentStore;

/// Copy template entries onto columns whose name matches a template key exactly.
///
/// Returns the number of columns that matched.
pub fn apply_template(store: &mut AssignmentStore, template: &MappingTemplate) -> usize {
    let mut matched = 0;
    for (column, target) in &template.column_mappings {
        if store.contains(column) {
            store.set(column, Assignment::from_wire(target));
            matched += 1;
        }
    }
    debug!(
        report_type = %template.report_type,
        matched,
        template_size = template.column_mappings.len(),
        "template applied"
    );
    matched
}

/// The dictionary persisted for future sessions.
///
/// Only real target fields are kept so a saved template never forces a skip.
pub fn template_from_store(report_type: &str, store: &AssignmentStore) -> MappingTemplate {
    MappingTemplate::new(report_type, store.sanitized())
}

/// Fetch the template for `report_type`, treating any failure as "no template".
pub async fn fetch_template<T: TemplateStore>(
    templates: &T,
    report_type: &str,
) -> Option<MappingTemplate> {
    match templates.get_template(report_type).await {
        Ok(Some(template)) if !template.is_empty() => Some(template),
        Ok(_) => {
            debug!(report_type, "no saved template");
            None
        }
        Err(error) => {
            debug!(report_type, %error, "template load failed; continuing without one");
            None
        }
    }
}

/// Persist `mappings`, swallowing failures. Returns whether the save landed.
pub async fn store_template<T: TemplateStore>(
    templates: &T,
    report_type: &str,
    mappings: &BTreeMap<String, String>,
) -> bool {
    match templates.save_template(report_type, mappings).await {
        Ok(()) => {
            info!(report_type, entries = mappings.len(), "template saved");
            true
        }
        Err(error) => {
            warn!(report_type, %error, "template save failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(pairs: &[(&str, &str)]) -> MappingTemplate {
        MappingTemplate::new(
            "vat_return",
            pairs
                .iter()
                .map(|(c, t)| ((*c).to_string(), (*t).to_string()))
                .collect(),
        )
    }

    #[test]
    fn counts_only_matching_columns() {
        let mut store = AssignmentStore::new(["Date", "Amount", "Memo"]);
        let matched = apply_template(
            &mut store,
            &template(&[("Date", "date"), ("Amount", "net_amount"), ("Gone", "vat_rate")]),
        );
        assert_eq!(matched, 2);
        assert_eq!(store.get("Amount"), Some(&Assignment::field("net_amount")));
        assert_eq!(store.get("Memo"), Some(&Assignment::Unassigned));
        assert!(!store.contains("Gone"));
    }

    #[test]
    fn names_must_match_exactly() {
        let mut store = AssignmentStore::new(["date"]);
        let matched = apply_template(&mut store, &template(&[("Date", "date")]));
        assert_eq!(matched, 0);
        assert_eq!(store.get("date"), Some(&Assignment::Unassigned));
    }

    #[test]
    fn extracted_template_has_no_skips() {
        let mut store = AssignmentStore::new(["Date", "Memo", "Other"]);
        store.set("Date", Assignment::field("date"));
        store.set("Memo", Assignment::Skip);
        let template = template_from_store("vat_return", &store);
        assert_eq!(template.column_mappings.len(), 1);
        assert_eq!(template.report_type, "vat_return");
    }
}
