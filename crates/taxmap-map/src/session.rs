//! One interactive mapping session for a single upload.
//!
//! The session owns the assignment store and the cached AI suggestion, and
//! exposes the imperative surface the UI drives: `set`, disambiguation,
//! `request_suggestion` and `confirm`. Derived state (conflicts, confidence
//! flags, preview) is recomputed from the store on every read.
//!
//! Sources overwrite each other in the order they are applied: a template
//! loaded after a suggestion wins for the columns it touches, and vice versa.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{Instrument, debug, info, info_span, warn};

use taxmap_model::{
    Assignment, CorrectionRecord, FieldCandidate, MappingTemplate, SampleData, SuggestionRequest,
    SuggestionResponse, TargetSchema,
};

use crate::confidence::{ConfidenceAnnotator, ConfidenceBucket};
use crate::conflict::{ConflictReport, detect_conflicts};
use crate::corrections::{deliver_corrections, generate_corrections};
use crate::disambiguation::{Contender, Disambiguator, Resolution};
use crate::error::{MappingError, Result, ServiceError};
use crate::preview::{PREVIEW_ROW_LIMIT, PreviewTable, project_preview};
use crate::service::{CorrectionSink, SuggestionService, TemplateStore};
use crate::store::{AssignmentStore, MappingSummary};
use crate::template::{apply_template, fetch_template, store_template, template_from_store};

/// Sample rows sent along with a suggestion request.
pub const SUGGESTION_SAMPLE_ROWS: usize = 5;

/// Handle for an issued suggestion request.
///
/// Only the most recently issued ticket may apply its response.
#[derive(Debug, Clone)]
pub struct SuggestionTicket {
    seq: u64,
    request: SuggestionRequest,
}

impl SuggestionTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &SuggestionRequest {
        &self.request
    }
}

/// What happened to a suggestion response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// The response was applied; `applied` columns were set from it.
    Applied { applied: usize },
    /// A newer request was issued meanwhile; the response was dropped.
    Stale { seq: u64, latest: u64 },
}

/// Read model handed to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct MappingView {
    pub report_type: String,
    /// Every column and its assignment, in upload order.
    pub assignment: Vec<(String, Assignment)>,
    pub conflicts: ConflictReport,
    pub low_confidence: BTreeSet<String>,
    pub confidence: Option<ConfidenceBucket>,
    pub template_loaded: bool,
    /// Target field currently open for disambiguation.
    pub disambiguating: Option<String>,
    pub summary: MappingSummary,
    pub preview: PreviewTable,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Confirmation {
    /// Final mapping with skipped and unassigned columns removed.
    pub mappings: BTreeMap<String, String>,
    pub corrections: Vec<CorrectionRecord>,
    pub template_saved: bool,
    pub corrections_delivered: bool,
}

#[derive(Debug, Clone)]
pub struct MappingSession {
    schema: TargetSchema,
    samples: SampleData,
    store: AssignmentStore,
    confidence: ConfidenceAnnotator,
    candidates: BTreeMap<String, Vec<FieldCandidate>>,
    /// Supplier mapping exactly as last returned; `None` until one is applied.
    suggested: Option<BTreeMap<String, String>>,
    template_loaded: bool,
    resolver: Disambiguator,
    issued: u64,
}

impl MappingSession {
    /// Start a session with every upload column unassigned.
    pub fn new(schema: TargetSchema, samples: SampleData) -> Self {
        let store = AssignmentStore::new(samples.columns().iter().cloned());
        debug!(
            report_type = %schema.report_type,
            columns = store.len(),
            fields = schema.fields.len(),
            "mapping session created"
        );
        Self {
            schema,
            samples,
            store,
            confidence: ConfidenceAnnotator::new(),
            candidates: BTreeMap::new(),
            suggested: None,
            template_loaded: false,
            resolver: Disambiguator::new(),
            issued: 0,
        }
    }

    pub fn report_type(&self) -> &str {
        &self.schema.report_type
    }

    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    pub fn samples(&self) -> &SampleData {
        &self.samples
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn assignment(&self, column: &str) -> Option<&Assignment> {
        self.store.get(column)
    }

    pub fn template_loaded(&self) -> bool {
        self.template_loaded
    }

    pub fn has_suggestion(&self) -> bool {
        self.suggested.is_some()
    }

    pub fn candidates(&self, column: &str) -> &[FieldCandidate] {
        self.candidates
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Manual edits
    // ---------------------------------------------------------------------

    /// Bind a column; the single mutation the UI's selectors reduce to.
    pub fn set(&mut self, column: &str, target: Assignment) -> Result<()> {
        if self.store.set(column, target) {
            Ok(())
        } else {
            Err(MappingError::ColumnNotFound(column.to_string()))
        }
    }

    // ---------------------------------------------------------------------
    // Derived state
    // ---------------------------------------------------------------------

    pub fn conflicts(&self) -> ConflictReport {
        detect_conflicts(&self.store)
    }

    pub fn is_low_confidence(&self, column: &str) -> bool {
        self.confidence.is_low_confidence(column)
    }

    pub fn column_confidence(&self, column: &str) -> Option<f64> {
        self.confidence.column_confidence(column)
    }

    pub fn confidence_bucket(&self) -> Option<ConfidenceBucket> {
        self.confidence.bucket()
    }

    pub fn summary(&self) -> MappingSummary {
        self.store.summary(self.conflicts().count())
    }

    /// Target fields no column currently claims.
    pub fn unmapped_fields(&self) -> Vec<&str> {
        self.store.unmapped_fields(&self.schema)
    }

    pub fn preview(&self) -> PreviewTable {
        project_preview(&self.store, &self.samples, PREVIEW_ROW_LIMIT)
    }

    pub fn view(&self) -> MappingView {
        let conflicts = self.conflicts();
        MappingView {
            report_type: self.schema.report_type.clone(),
            assignment: self
                .store
                .iter()
                .map(|(c, a)| (c.to_string(), a.clone()))
                .collect(),
            low_confidence: self
                .store
                .columns()
                .iter()
                .filter(|c| self.confidence.is_low_confidence(c))
                .cloned()
                .collect(),
            confidence: self.confidence.bucket(),
            template_loaded: self.template_loaded,
            disambiguating: self.resolver.open_target().map(str::to_string),
            summary: self.store.summary(conflicts.count()),
            preview: self.preview(),
            conflicts,
        }
    }

    /// Gate for leaving the mapping step: refused while any conflict remains.
    pub fn proceed_to_preview(&self) -> Result<PreviewTable> {
        let count = self.conflicts().count();
        if count > 0 {
            return Err(MappingError::UnresolvedConflicts { count });
        }
        Ok(self.preview())
    }

    // ---------------------------------------------------------------------
    // Disambiguation
    // ---------------------------------------------------------------------

    pub fn open_disambiguation(&mut self, target: &str) -> Result<Vec<Contender>> {
        self.resolver.open(&self.store, target)?;
        self.contenders()
    }

    /// Live competitors for the open target.
    pub fn contenders(&self) -> Result<Vec<Contender>> {
        self.resolver
            .contenders(&self.store, &self.samples, &self.candidates)
    }

    pub fn disambiguating(&self) -> Option<&str> {
        self.resolver.open_target()
    }

    pub fn resolve_disambiguation(&mut self, winner: &str) -> Result<Resolution> {
        self.resolver.resolve(&mut self.store, winner)
    }

    pub fn close_disambiguation(&mut self) {
        self.resolver.close();
    }

    // ---------------------------------------------------------------------
    // Templates
    // ---------------------------------------------------------------------

    /// Merge a template into the assignment; returns matched columns.
    ///
    /// The loaded flag is only raised when at least one column matched.
    pub fn apply_template(&mut self, template: &MappingTemplate) -> usize {
        let matched = apply_template(&mut self.store, template);
        if matched > 0 {
            self.template_loaded = true;
        }
        matched
    }

    /// Fetch and apply the saved template for this report type.
    ///
    /// Failures and misses are silent; returns matched columns.
    pub async fn load_template<T: TemplateStore>(&mut self, templates: &T) -> usize {
        match fetch_template(templates, &self.schema.report_type).await {
            Some(template) => {
                let matched = self.apply_template(&template);
                info!(
                    report_type = %self.schema.report_type,
                    matched,
                    "saved template checked"
                );
                matched
            }
            None => 0,
        }
    }

    // ---------------------------------------------------------------------
    // AI suggestions
    // ---------------------------------------------------------------------

    /// Issue a new suggestion request, superseding any in flight.
    pub fn begin_suggestion(&mut self) -> SuggestionTicket {
        self.issued += 1;
        let request = SuggestionRequest {
            columns: self.samples.columns().to_vec(),
            sample_rows: self
                .samples
                .rows()
                .iter()
                .take(SUGGESTION_SAMPLE_ROWS)
                .cloned()
                .collect(),
            report_type: self.schema.report_type.clone(),
        };
        debug!(seq = self.issued, "suggestion requested");
        SuggestionTicket {
            seq: self.issued,
            request,
        }
    }

    /// Apply the response to a ticket.
    ///
    /// Responses to superseded tickets are dropped. A failed request leaves
    /// the assignment exactly as it was.
    pub fn finish_suggestion(
        &mut self,
        ticket: &SuggestionTicket,
        response: std::result::Result<SuggestionResponse, ServiceError>,
    ) -> Result<SuggestionOutcome> {
        if ticket.seq != self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "discarding stale suggestion"
            );
            return Ok(SuggestionOutcome::Stale {
                seq: ticket.seq,
                latest: self.issued,
            });
        }
        let response = response.map_err(|error| {
            warn!(%error, "mapping suggestion failed");
            MappingError::SuggestionFailed(error)
        })?;
        Ok(SuggestionOutcome::Applied {
            applied: self.apply_suggestion(response),
        })
    }

    fn apply_suggestion(&mut self, response: SuggestionResponse) -> usize {
        let mut applied = 0;
        for (column, target) in &response.mappings {
            if self.store.set(column, Assignment::from_wire(target)) {
                applied += 1;
            }
        }
        self.confidence.update(&response);
        info!(
            applied,
            unmapped = response.unmapped.len(),
            supplier_conflicts = response.conflicts.len(),
            confidence = response.confidence,
            "mapping suggestion applied"
        );
        self.candidates = response.candidates;
        self.suggested = Some(response.mappings);
        applied
    }

    /// Request and apply a suggestion in one step.
    pub async fn request_suggestion<S: SuggestionService>(
        &mut self,
        service: &S,
    ) -> Result<SuggestionOutcome> {
        let ticket = self.begin_suggestion();
        let response = service.suggest_mapping(ticket.request()).await;
        self.finish_suggestion(&ticket, response)
    }

    // ---------------------------------------------------------------------
    // Confirmation
    // ---------------------------------------------------------------------

    /// Validate and compute the confirmation without contacting any service.
    pub fn prepare_confirmation(&self) -> Result<Confirmation> {
        let count = self.conflicts().count();
        if count > 0 {
            return Err(MappingError::UnresolvedConflicts { count });
        }
        let mappings = template_from_store(&self.schema.report_type, &self.store).column_mappings;
        if mappings.is_empty() {
            return Err(MappingError::NothingMapped);
        }
        let corrections = generate_corrections(self.suggested.as_ref(), &mappings, &self.samples);
        Ok(Confirmation {
            mappings,
            corrections,
            template_saved: false,
            corrections_delivered: false,
        })
    }

    /// Confirm the mapping, then save the template and record corrections.
    ///
    /// Delivery failures are logged and reported in the returned flags; they
    /// never undo the confirmation.
    pub async fn confirm<T, C>(&self, templates: &T, sink: &C) -> Result<Confirmation>
    where
        T: TemplateStore,
        C: CorrectionSink,
    {
        let mut confirmation = self.prepare_confirmation()?;
        let report_type = self.schema.report_type.as_str();
        info!(
            mapped = confirmation.mappings.len(),
            corrections = confirmation.corrections.len(),
            "mapping confirmed"
        );

        async {
            confirmation.template_saved =
                store_template(templates, report_type, &confirmation.mappings).await;
            confirmation.corrections_delivered =
                deliver_corrections(sink, report_type, &confirmation.corrections).await;
        }
        .instrument(info_span!("confirm", report_type))
        .await;
        Ok(confirmation)
    }
}
