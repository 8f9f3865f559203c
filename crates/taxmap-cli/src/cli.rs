//! CLI argument definitions for `taxmap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use taxmap_cli::edits::{ColumnEdit, Pick, parse_column_edit, parse_pick};
use taxmap_cli::upload::DEFAULT_SAMPLE_ROWS;

#[derive(Parser)]
#[command(
    name = "taxmap",
    version,
    about = "Map spreadsheet columns onto tax report fields",
    long_about = "Map the columns of an uploaded spreadsheet onto the target fields of a \
                  tax report type.\n\n\
                  Combines a saved template, a recorded AI suggestion and manual edits, \
                  reports conflicting columns, and records corrections on confirmation."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow spreadsheet cell values to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Target field CSV to use instead of the built-in schemas.
    #[arg(long = "schema", value_name = "CSV", global = true)]
    pub schema: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the target fields of one or all report types.
    Fields(FieldsArgs),

    /// Run a mapping session for an uploaded CSV.
    Resolve(ResolveArgs),
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Report type to list (all when omitted).
    #[arg(value_name = "REPORT_TYPE")]
    pub report_type: Option<String>,

    /// Print plain text instead of tables.
    #[arg(long = "plain")]
    pub plain: bool,
}

#[derive(Parser)]
pub struct ResolveArgs {
    /// Uploaded spreadsheet, as CSV with a header row.
    #[arg(value_name = "UPLOAD")]
    pub upload: PathBuf,

    /// Report type whose target fields the columns map onto.
    #[arg(long = "report-type", value_name = "TYPE")]
    pub report_type: String,

    /// Recorded mapping suggestion (JSON) to apply.
    #[arg(long = "suggestion", value_name = "FILE")]
    pub suggestion: Option<PathBuf>,

    /// Directory holding saved templates.
    #[arg(long = "templates", value_name = "DIR", default_value = ".taxmap/templates")]
    pub templates: PathBuf,

    /// Do not apply the saved template for the report type.
    #[arg(long = "no-template")]
    pub no_template: bool,

    /// Bind a column: COLUMN=TARGET, COLUMN=skip or COLUMN= to clear.
    #[arg(long = "set", value_name = "COLUMN=TARGET", value_parser = parse_column_edit)]
    pub set: Vec<ColumnEdit>,

    /// Resolve a conflicted target field in favour of one column.
    #[arg(long = "pick", value_name = "TARGET=COLUMN", value_parser = parse_pick)]
    pub pick: Vec<Pick>,

    /// Confirm the mapping: save the template and record corrections.
    #[arg(long = "confirm")]
    pub confirm: bool,

    /// Append correction records to this JSON-lines file.
    #[arg(long = "corrections-log", value_name = "FILE")]
    pub corrections_log: Option<PathBuf>,

    /// Rows read from the upload for samples and preview.
    #[arg(long = "sample-rows", value_name = "N", default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,

    /// Print plain text instead of tables.
    #[arg(long = "plain")]
    pub plain: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
