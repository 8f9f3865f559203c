use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use taxmap_map::{ConfidenceBucket, SuggestionOutcome};
use taxmap_model::Assignment;

use taxmap_cli::pipeline::ResolveOutcome;
use taxmap_cli::render::{assignment_label, render_plain};

pub fn print_outcome(outcome: &ResolveOutcome, plain: bool) {
    if plain {
        println!("{}", render_plain(outcome));
        return;
    }
    let view = &outcome.view;
    println!("Report type: {}", view.report_type);
    if outcome.template_matched > 0 {
        println!(
            "Template: applied to {} column(s)",
            outcome.template_matched
        );
    }
    match outcome.suggestion {
        Some(SuggestionOutcome::Applied { applied }) => {
            let confidence = view
                .confidence
                .map_or("unknown confidence", |b| b.description());
            println!("Suggestion: {applied} column(s), {confidence}");
        }
        Some(SuggestionOutcome::Stale { .. }) => println!("Suggestion: discarded (stale)"),
        None => {}
    }
    if let Some(message) = &outcome.suggestion_error {
        eprintln!("warning: {message}");
    }

    print_assignment_table(outcome);
    print_conflict_table(outcome);
    if !outcome.unmapped_fields.is_empty() {
        println!("Unmapped fields: {}", outcome.unmapped_fields.join(", "));
    }

    match &outcome.blocked {
        Some(error) => eprintln!("error: {}", error.user_message()),
        None => print_preview_table(outcome),
    }
    print_confirmation(outcome);
}

fn print_assignment_table(outcome: &ResolveOutcome) {
    let view = &outcome.view;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Target"),
        header_cell("Confidence"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (column, assignment) in &view.assignment {
        let conflicted = view.conflicts.target_of(column).is_some();
        let low = view.low_confidence.contains(column);
        let confidence = outcome
            .column_confidence(column)
            .map_or_else(|| dim_cell("-"), score_cell);
        table.add_row(vec![
            Cell::new(column)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            assignment_cell(assignment),
            confidence,
            status_cell(conflicted, low),
        ]);
    }
    let summary = &view.summary;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} mapped, {} skipped, {} unassigned",
            summary.mapped, summary.skipped, summary.unassigned
        ))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(summary.conflicts, Color::Red),
    ]);
    println!("{table}");
}

fn print_conflict_table(outcome: &ResolveOutcome) {
    for resolution in &outcome.resolutions {
        println!(
            "Resolved {}: kept {}, released {}",
            resolution.target,
            resolution.winner,
            resolution.released.join(", ")
        );
    }
    if outcome.open_conflicts.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Target"),
        header_cell("Column"),
        header_cell("Score"),
        header_cell("Samples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (target, contenders) in &outcome.open_conflicts {
        for contender in contenders {
            table.add_row(vec![
                Cell::new(target).fg(Color::Red),
                Cell::new(&contender.column),
                contender
                    .score
                    .map_or_else(|| dim_cell("-"), score_cell),
                Cell::new(contender.sample_values.join(", ")),
            ]);
        }
    }
    println!();
    println!("Conflicts (resolve with --pick TARGET=COLUMN):");
    println!("{table}");
}

fn print_preview_table(outcome: &ResolveOutcome) {
    let preview = &outcome.view.preview;
    if preview.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(
        preview
            .columns
            .iter()
            .map(|c| header_cell(&c.target))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in &preview.rows {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }
    println!();
    println!("Preview:");
    println!("{table}");
}

fn print_confirmation(outcome: &ResolveOutcome) {
    let Some(confirmation) = &outcome.confirmation else {
        return;
    };
    println!();
    println!(
        "Confirmed {} mapping(s); template {}; corrections {}",
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
        }
    );
    if confirmation.corrections.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Suggested"),
        header_cell("Confirmed"),
        header_cell("Samples"),
    ]);
    apply_table_style(&mut table);
    for record in &confirmation.corrections {
        table.add_row(vec![
            Cell::new(&record.column),
            assignment_cell(&record.old_target),
            assignment_cell(&record.new_target),
            Cell::new(record.sample_values.join(", ")),
        ]);
    }
    println!("Corrections:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn assignment_cell(assignment: &Assignment) -> Cell {
    match assignment {
        Assignment::Field(key) => Cell::new(key).fg(Color::Green),
        Assignment::Skip | Assignment::Unassigned => dim_cell(assignment_label(assignment)),
    }
}

fn score_cell(score: f64) -> Cell {
    let color = match ConfidenceBucket::from_score(score) {
        ConfidenceBucket::High => Color::Green,
        ConfidenceBucket::Medium => Color::Yellow,
        ConfidenceBucket::Low => Color::Red,
    };
    Cell::new(format!("{score:.2}")).fg(color)
}

fn status_cell(conflicted: bool, low_confidence: bool) -> Cell {
    match (conflicted, low_confidence) {
        (true, _) => Cell::new("CONFLICT")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        (false, true) => Cell::new("LOW").fg(Color::Yellow),
        (false, false) => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
