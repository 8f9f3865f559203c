//! Interactive field-mapping resolution engine.
//!
//! Converges an upload's source columns, an AI suggestion, a saved template
//! and the user's edits onto one conflict-free assignment of columns to a
//! report type's target fields, and derives the correction records that
//! describe how the confirmed mapping diverged from the suggestion.
//!
//! # Example
//!
//! ```ignore
//! use taxmap_map::{MappingSession, MemoryCorrectionSink, MemoryTemplateStore};
//! use taxmap_model::Assignment;
//!
//! let mut session = MappingSession::new(schema, samples);
//! session.load_template(&templates).await;
//! session.request_suggestion(&supplier).await?;
//!
//! for (target, _) in session.conflicts().groups().clone() {
//!     let contenders = session.open_disambiguation(&target)?;
//!     session.resolve_disambiguation(&contenders[0].column)?;
//! }
//!
//! let preview = session.proceed_to_preview()?;
//! let confirmation = session.confirm(&templates, &sink).await?;
//! ```

#![deny(unsafe_code)]

pub mod confidence;
pub mod conflict;
pub mod corrections;
pub mod disambiguation;
pub mod error;
pub mod preview;
pub mod repository;
pub mod service;
pub mod session;
pub mod store;
pub mod template;

pub use confidence::{ConfidenceAnnotator, ConfidenceBucket, HIGH_CONFIDENCE, MEDIUM_CONFIDENCE};
pub use conflict::{ConflictReport, detect_conflicts};
pub use corrections::{CORRECTION_SAMPLE_LIMIT, generate_corrections};
pub use disambiguation::{Contender, Disambiguation, Disambiguator, Resolution};
pub use error::{MappingError, Result, ServiceError};
pub use preview::{PREVIEW_ROW_LIMIT, PreviewColumn, PreviewTable, project_preview};
pub use repository::{
    CorrectionBatch, CorrectionLog, StoredTemplate, TemplateMetadata, TemplateRepository,
};
pub use service::{
    CorrectionSink, MemoryCorrectionSink, MemoryTemplateStore, RecordedSuggestions,
    SuggestionService, TemplateStore,
};
pub use session::{Confirmation, MappingSession, MappingView, SuggestionOutcome, SuggestionTicket};
pub use store::{AssignmentStore, MappingSummary};
pub use template::{apply_template, template_from_store};
