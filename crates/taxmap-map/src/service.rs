//! Capabilities the engine consumes from remote collaborators.
//!
//! Each is an injected trait so sessions can run against the real services,
//! a local file repository, or the in-memory fakes below.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use taxmap_model::{CorrectionRecord, MappingTemplate, SuggestionRequest, SuggestionResponse};

use crate::error::ServiceError;

/// `suggestMapping`: the black-box AI supplier.
#[allow(async_fn_in_trait)]
pub trait SuggestionService {
    async fn suggest_mapping(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, ServiceError>;
}

/// `getTemplate` / `saveTemplate`: per-report-type template persistence.
#[allow(async_fn_in_trait)]
pub trait TemplateStore {
    async fn get_template(&self, report_type: &str)
    -> Result<Option<MappingTemplate>, ServiceError>;

    async fn save_template(
        &self,
        report_type: &str,
        column_mappings: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError>;
}

/// `recordCorrections`: the learning-signal endpoint.
#[allow(async_fn_in_trait)]
pub trait CorrectionSink {
    async fn record_corrections(
        &self,
        report_type: &str,
        records: &[CorrectionRecord],
    ) -> Result<(), ServiceError>;
}

/// Templates kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<BTreeMap<String, MappingTemplate>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a template, replacing any existing one for the same report type.
    pub fn insert(&self, template: MappingTemplate) {
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(template.report_type.clone(), template);
    }

    pub fn get(&self, report_type: &str) -> Option<MappingTemplate> {
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(report_type)
            .cloned()
    }
}

impl TemplateStore for MemoryTemplateStore {
    async fn get_template(
        &self,
        report_type: &str,
    ) -> Result<Option<MappingTemplate>, ServiceError> {
        Ok(self.get(report_type))
    }

    async fn save_template(
        &self,
        report_type: &str,
        column_mappings: &BTreeMap<String, String>,
    ) -> Result<(), ServiceError> {
        self.insert(MappingTemplate::new(report_type, column_mappings.clone()));
        Ok(())
    }
}

/// Collects delivered correction batches in memory.
#[derive(Debug, Default)]
pub struct MemoryCorrectionSink {
    batches: Mutex<Vec<(String, Vec<CorrectionRecord>)>>,
}

impl MemoryCorrectionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every batch received so far, with its report type.
    pub fn batches(&self) -> Vec<(String, Vec<CorrectionRecord>)> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All records across batches.
    pub fn records(&self) -> Vec<CorrectionRecord> {
        self.batches()
            .into_iter()
            .flat_map(|(_, records)| records)
            .collect()
    }
}

impl CorrectionSink for MemoryCorrectionSink {
    async fn record_corrections(
        &self,
        report_type: &str,
        records: &[CorrectionRecord],
    ) -> Result<(), ServiceError> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((report_type.to_string(), records.to_vec()));
        Ok(())
    }
}

/// Replays a fixed supplier response, e.g. one captured to a JSON file.
#[derive(Debug, Clone)]
pub struct RecordedSuggestions {
    response: SuggestionResponse,
}

impl RecordedSuggestions {
    pub fn new(response: SuggestionResponse) -> Self {
        Self { response }
    }

    /// Decode a captured `suggestMapping` response body.
    pub fn from_json(body: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(body)
            .map(Self::new)
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

impl SuggestionService for RecordedSuggestions {
    async fn suggest_mapping(
        &self,
        _request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, ServiceError> {
        Ok(self.response.clone())
    }
}
