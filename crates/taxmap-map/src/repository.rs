//! File-system storage for mapping templates and correction logs.
//!
//! Templates are stored as one JSON file per report type,
//! `{report_type}.json`, under the repository directory. A later save for
//! the same report type overwrites the earlier one. File names are a
//! normalized form of the report type, so each file also records the exact
//! report type it belongs to and is only served for that one.
//!
//! Correction batches are appended to a JSON-lines log so a downstream
//! learning job can pick them up.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use taxmap_model::{CorrectionRecord, MappingTemplate};

use crate::error::ServiceError;
use crate::service::{CorrectionSink, TemplateStore};

const FORMAT_VERSION: &str = "1.0";

/// Directory-backed template repository.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    base_dir: PathBuf,
}

/// Metadata about a stored template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub report_type: String,
    pub file_path: PathBuf,
    pub mapping_count: usize,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Template plus repository bookkeeping, as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTemplate {
    #[serde(flatten)]
    pub template: MappingTemplate,
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl StoredTemplate {
    pub fn new(template: MappingTemplate) -> Self {
        Self {
            template,
            saved_at: Some(Utc::now()),
            version: default_version(),
        }
    }
}

impl TemplateRepository {
    /// Open (creating if needed) a repository rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create template repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write a template, replacing any previous one for its report type.
    ///
    /// Fails rather than overwrite a file held by a different report type
    /// whose name normalizes to the same file.
    pub fn save(&self, template: &MappingTemplate) -> Result<PathBuf> {
        let stored = StoredTemplate::new(template.clone());
        let path = self.template_path(&template.report_type);
        if path.exists() {
            let existing = read_stored(&path)?;
            if existing.template.report_type != template.report_type {
                bail!(
                    "Template file {} already belongs to report type {}",
                    path.display(),
                    existing.template.report_type
                );
            }
        }
        let json = serde_json::to_string_pretty(&stored).with_context(|| {
            format!("Failed to serialize template for {}", template.report_type)
        })?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write template to {}", path.display()))?;
        Ok(path)
    }

    /// Load the template for a report type. `None` if none was saved.
    pub fn load(&self, report_type: &str) -> Result<Option<MappingTemplate>> {
        Ok(self.load_stored(report_type)?.map(|s| s.template))
    }

    /// Load the stored template for exactly `report_type`.
    ///
    /// A file that another report type's name normalizes onto is not a match.
    pub fn load_stored(&self, report_type: &str) -> Result<Option<StoredTemplate>> {
        let path = self.template_path(report_type);
        if !path.exists() {
            return Ok(None);
        }
        let stored = read_stored(&path)?;
        if stored.template.report_type != report_type {
            warn!(
                report_type,
                stored = %stored.template.report_type,
                path = %path.display(),
                "template file belongs to another report type"
            );
            return Ok(None);
        }
        Ok(Some(stored))
    }

    /// All valid templates, sorted by report type.
    ///
    /// Entries that cannot be read or parsed are logged and skipped.
    pub fn list(&self) -> Result<Vec<TemplateMetadata>> {
        let mut metadata = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?
        {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(error) => {
                    warn!(%error, "skipping unreadable repository entry");
                    continue;
                }
            };
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_stored(&path) {
                Ok(stored) => metadata.push(TemplateMetadata {
                    report_type: stored.template.report_type.clone(),
                    mapping_count: stored.template.column_mappings.len(),
                    saved_at: stored.saved_at,
                    file_path: path,
                }),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %format!("{error:#}"),
                        "skipping template"
                    );
                }
            }
        }
        metadata.sort_by(|a, b| a.report_type.cmp(&b.report_type));
        Ok(metadata)
    }

    pub fn delete(&self, report_type: &str) -> Result<bool> {
        let path = self.template_path(report_type);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete template: {}", path.display()))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn exists(&self, report_type: &str) -> bool {
        self.template_path(report_type).exists()
    }

    fn template_path(&self, report_type: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", normalize_id(report_type)))
    }
}

impl TemplateStore for TemplateRepository {
    async fn get_template(
        &self,
        report_type: &str,
    ) -> std::result::Result<Option<MappingTemplate>, ServiceError> {
        let repo = self.clone();
        let report_type = report_type.to_string();
        tokio::task::spawn_blocking(move || repo.load(&report_type))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .map_err(|e| ServiceError::Storage(format!("{e:#}")))
    }

    async fn save_template(
        &self,
        report_type: &str,
        column_mappings: &BTreeMap<String, String>,
    ) -> std::result::Result<(), ServiceError> {
        let repo = self.clone();
        let template = MappingTemplate::new(report_type, column_mappings.clone());
        tokio::task::spawn_blocking(move || repo.save(&template))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .map(|_| ())
            .map_err(|e| ServiceError::Storage(format!("{e:#}")))
    }
}

/// One line of the correction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionBatch {
    pub report_type: String,
    pub recorded_at: DateTime<Utc>,
    pub corrections: Vec<CorrectionRecord>,
}

/// Append-only JSON-lines log of correction batches.
#[derive(Debug, Clone)]
pub struct CorrectionLog {
    path: PathBuf,
}

impl CorrectionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, report_type: &str, records: &[CorrectionRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let batch = CorrectionBatch {
            report_type: report_type.to_string(),
            recorded_at: Utc::now(),
            corrections: records.to_vec(),
        };
        let line = serde_json::to_string(&batch).context("Failed to serialize corrections")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        Ok(())
    }

    /// Read every batch back, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<CorrectionBatch>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("Failed to parse correction batch"))
            .collect()
    }
}

impl CorrectionSink for CorrectionLog {
    async fn record_corrections(
        &self,
        report_type: &str,
        records: &[CorrectionRecord],
    ) -> std::result::Result<(), ServiceError> {
        let log = self.clone();
        let report_type = report_type.to_string();
        let records = records.to_vec();
        tokio::task::spawn_blocking(move || log.append(&report_type, &records))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?
            .map_err(|e| ServiceError::Storage(format!("{e:#}")))
    }
}

fn read_stored(path: &Path) -> Result<StoredTemplate> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse template from {}", path.display()))
}

/// Normalize a report type for use in file names.
fn normalize_id(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
