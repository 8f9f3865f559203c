//! Plain-text rendering of a resolve run, for `--plain` and scripts.

use taxmap_map::SuggestionOutcome;
use taxmap_model::{Assignment, TargetSchema};

use crate::pipeline::ResolveOutcome;

/// Display form of an assignment.
pub fn assignment_label(assignment: &Assignment) -> &str {
    match assignment {
        Assignment::Unassigned => "(unassigned)",
        Assignment::Skip => "(skip)",
        Assignment::Field(key) => key,
    }
}

pub fn render_plain(outcome: &ResolveOutcome) -> String {
    let view = &outcome.view;
    let mut lines = vec![format!("report type: {}", view.report_type)];

    if outcome.template_matched > 0 {
        lines.push(format!(
            "template: {} column(s) matched",
            outcome.template_matched
        ));
    }
    match outcome.suggestion {
        Some(SuggestionOutcome::Applied { applied }) => {
            let confidence = view.confidence.map_or("unknown", |b| b.as_str());
            lines.push(format!(
                "suggestion: {applied} column(s) applied, {confidence} confidence"
            ));
        }
        Some(SuggestionOutcome::Stale { .. }) => {
            lines.push("suggestion: discarded, a newer request superseded it".to_string());
        }
        None => {}
    }
    if let Some(message) = &outcome.suggestion_error {
        lines.push(format!("suggestion: {message}"));
    }

    lines.push("assignment:".to_string());
    for (column, assignment) in &view.assignment {
        let mut line = format!("  {column} -> {}", assignment_label(assignment));
        if view.conflicts.target_of(column).is_some() {
            line.push_str(" [conflict]");
        }
        if view.low_confidence.contains(column) {
            line.push_str(" [low confidence]");
        }
        lines.push(line);
    }

    for resolution in &outcome.resolutions {
        lines.push(format!(
            "resolved {}: kept {}, released {}",
            resolution.target,
            resolution.winner,
            resolution.released.join(", ")
        ));
    }
    for (target, contenders) in &outcome.open_conflicts {
        let columns: Vec<&str> = contenders.iter().map(|c| c.column.as_str()).collect();
        lines.push(format!("conflict {target}: {}", columns.join(", ")));
    }
    if !outcome.unmapped_fields.is_empty() {
        lines.push(format!(
            "unmapped fields: {}",
            outcome.unmapped_fields.join(", ")
        ));
    }

    let summary = &view.summary;
    lines.push(format!(
        "{} mapped, {} skipped, {} unassigned, {} conflict(s)",
        summary.mapped, summary.skipped, summary.unassigned, summary.conflicts
    ));

    match &outcome.blocked {
        Some(error) => lines.push(format!("blocked: {}", error.user_message())),
        None if !view.preview.is_empty() => {
            lines.push("preview:".to_string());
            let header: Vec<&str> = view
                .preview
                .columns
                .iter()
                .map(|c| c.target.as_str())
                .collect();
            lines.push(format!("  {}", header.join(" | ")));
            for row in &view.preview.rows {
                lines.push(format!("  {}", row.join(" | ")));
            }
        }
        None => {}
    }

    if let Some(confirmation) = &outcome.confirmation {
        lines.push(format!(
            "confirmed: {} mapping(s), template {}, corrections {}",
            confirmation.mappings.len(),
            if confirmation.template_saved {
                "saved"
            } else {
                "not saved"
            },
            if confirmation.corrections_delivered {
                "recorded"
            } else {
                "not recorded"
            },
        ));
        for record in &confirmation.corrections {
            lines.push(format!(
                "correction {}: {} -> {} [{}]",
                record.column,
                assignment_label(&record.old_target),
                assignment_label(&record.new_target),
                record.sample_values.join(", ")
            ));
        }
    }

    lines.join("\n")
}

/// Target fields of each schema, one per line, grouped.
pub fn render_fields_plain(schemas: &[TargetSchema]) -> String {
    let mut lines = Vec::new();
    for schema in schemas {
        lines.push(schema.report_type.clone());
        for (group, fields) in schema.grouped() {
            lines.push(format!("  {}", group.unwrap_or("Other")));
            for field in fields {
                lines.push(format!("    {:<20} {}", field.key, field.label));
            }
        }
    }
    lines.join("\n")
}
