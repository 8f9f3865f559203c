use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;

use taxmap_cli::pipeline::{ResolveOptions, ResolveOutcome, load_schema, resolve};
use taxmap_cli::render::render_fields_plain;

use crate::cli::{FieldsArgs, ResolveArgs};
use crate::summary::{apply_table_style, header_cell};

pub fn run_fields(args: &FieldsArgs, schema_file: Option<&Path>) -> Result<()> {
    let schemas = match (&args.report_type, schema_file) {
        (Some(report_type), _) => vec![load_schema(report_type, schema_file)?],
        (None, Some(path)) => taxmap_schema::load_from_path(path)
            .with_context(|| format!("load schema file: {}", path.display()))?,
        (None, None) => taxmap_schema::load().context("load built-in schemas")?,
    };

    if args.plain {
        println!("{}", render_fields_plain(&schemas));
        return Ok(());
    }
    for schema in schemas {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Group"),
            header_cell("Field"),
            header_cell("Label"),
        ]);
        apply_table_style(&mut table);
        for (group, fields) in schema.grouped() {
            for field in fields {
                table.add_row(vec![
                    group.unwrap_or("-").to_string(),
                    field.key.clone(),
                    field.label.clone(),
                ]);
            }
        }
        println!("Report type: {}", schema.report_type);
        println!("{table}");
    }
    Ok(())
}

pub async fn run_resolve(args: &ResolveArgs, schema_file: Option<&Path>) -> Result<ResolveOutcome> {
    let options = ResolveOptions {
        upload: args.upload.clone(),
        report_type: args.report_type.clone(),
        schema_file: schema_file.map(Path::to_path_buf),
        suggestion: args.suggestion.clone(),
        templates: args.templates.clone(),
        use_template: !args.no_template,
        edits: args.set.clone(),
        picks: args.pick.clone(),
        confirm: args.confirm,
        corrections_log: args.corrections_log.clone(),
        sample_rows: args.sample_rows,
    };
    resolve(&options).await
}
