//! One `taxmap resolve` run: template, suggestion, edits, picks, confirm.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::{Instrument, info, info_span, warn};

use taxmap_map::{
    Confirmation, Contender, CorrectionLog, MappingError, MappingSession, MappingView,
    MemoryCorrectionSink, RecordedSuggestions, Resolution, SuggestionOutcome, TemplateRepository,
};
use taxmap_model::TargetSchema;

use crate::edits::{ColumnEdit, Pick};
use crate::upload::read_upload;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub upload: PathBuf,
    pub report_type: String,
    /// Target field CSV replacing the embedded one.
    pub schema_file: Option<PathBuf>,
    /// Recorded supplier response to replay.
    pub suggestion: Option<PathBuf>,
    pub templates: PathBuf,
    pub use_template: bool,
    pub edits: Vec<ColumnEdit>,
    pub picks: Vec<Pick>,
    pub confirm: bool,
    pub corrections_log: Option<PathBuf>,
    pub sample_rows: usize,
}

#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub view: MappingView,
    pub template_matched: usize,
    pub suggestion: Option<SuggestionOutcome>,
    /// User-facing reason the suggestion could not be applied.
    pub suggestion_error: Option<String>,
    /// Per-column confidence from the applied suggestion.
    pub scores: BTreeMap<String, f64>,
    pub resolutions: Vec<Resolution>,
    /// Competing columns for every conflict still open.
    pub open_conflicts: BTreeMap<String, Vec<Contender>>,
    pub unmapped_fields: Vec<String>,
    /// Validation failure that stopped the run short of preview or confirmation.
    pub blocked: Option<MappingError>,
    pub confirmation: Option<Confirmation>,
}

impl ResolveOutcome {
    pub fn has_errors(&self) -> bool {
        self.blocked.is_some()
    }

    pub fn column_confidence(&self, column: &str) -> Option<f64> {
        self.scores.get(column).copied()
    }
}

/// Schema for `report_type`, from `schema_file` when given.
pub fn load_schema(report_type: &str, schema_file: Option<&Path>) -> Result<TargetSchema> {
    match schema_file {
        Some(path) => {
            let schemas = taxmap_schema::load_from_path(path)
                .with_context(|| format!("load schema file: {}", path.display()))?;
            Ok(taxmap_schema::find_schema(schemas, report_type)?)
        }
        None => Ok(taxmap_schema::schema_for(report_type)?),
    }
}

pub async fn resolve(options: &ResolveOptions) -> Result<ResolveOutcome> {
    run_session(options)
        .instrument(info_span!("resolve", report_type = %options.report_type))
        .await
}

async fn run_session(options: &ResolveOptions) -> Result<ResolveOutcome> {
    let schema = load_schema(&options.report_type, options.schema_file.as_deref())?;
    let samples = read_upload(&options.upload, options.sample_rows)?;
    let mut session = MappingSession::new(schema, samples);
    let repository = TemplateRepository::new(&options.templates)?;

    let template_matched = if options.use_template {
        session.load_template(&repository).await
    } else {
        0
    };

    let mut suggestion = None;
    let mut suggestion_error = None;
    if let Some(path) = &options.suggestion {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("read suggestion: {}", path.display()))?;
        let supplier = RecordedSuggestions::from_json(&body)
            .with_context(|| format!("parse suggestion: {}", path.display()))?;
        match session.request_suggestion(&supplier).await {
            Ok(outcome) => suggestion = Some(outcome),
            Err(error) => suggestion_error = Some(error.user_message()),
        }
    }

    for edit in &options.edits {
        session
            .set(&edit.column, edit.assignment.clone())
            .map_err(|e| anyhow!(e.user_message()))?;
    }

    let mut resolutions = Vec::with_capacity(options.picks.len());
    for pick in &options.picks {
        session
            .open_disambiguation(&pick.target)
            .map_err(|e| anyhow!(e.user_message()))?;
        let resolution = session
            .resolve_disambiguation(&pick.column)
            .map_err(|e| anyhow!(e.user_message()))?;
        resolutions.push(resolution);
    }

    let open_conflicts = open_conflicts(&mut session);
    let mut blocked = session.proceed_to_preview().err();
    let mut confirmation = None;
    if options.confirm && blocked.is_none() {
        let result = match &options.corrections_log {
            Some(path) => session.confirm(&repository, &CorrectionLog::new(path)).await,
            None => {
                session
                    .confirm(&repository, &MemoryCorrectionSink::new())
                    .await
            }
        };
        match result {
            Ok(confirmed) => confirmation = Some(confirmed),
            Err(error) => blocked = Some(error),
        }
    }
    if let Some(error) = &blocked {
        warn!(%error, "mapping not accepted");
    }

    let scores = session
        .store()
        .columns()
        .iter()
        .filter_map(|c| session.column_confidence(c).map(|score| (c.clone(), score)))
        .collect();
    let outcome = ResolveOutcome {
        view: session.view(),
        scores,
        template_matched,
        suggestion,
        suggestion_error,
        resolutions,
        open_conflicts,
        unmapped_fields: session
            .unmapped_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
        blocked,
        confirmation,
    };
    info!(
        mapped = outcome.view.summary.mapped,
        conflicts = outcome.view.summary.conflicts,
        confirmed = outcome.confirmation.is_some(),
        "resolve finished"
    );
    Ok(outcome)
}

fn open_conflicts(session: &mut MappingSession) -> BTreeMap<String, Vec<Contender>> {
    let targets: Vec<String> = session.conflicts().groups().keys().cloned().collect();
    let mut open = BTreeMap::new();
    for target in targets {
        if let Ok(contenders) = session.open_disambiguation(&target) {
            open.insert(target, contenders);
        }
    }
    session.close_disambiguation();
    open
}
