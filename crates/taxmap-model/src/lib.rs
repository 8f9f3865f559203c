//! Data model for mapping uploaded spreadsheet columns onto a report's target fields.

pub mod assignment;
pub mod correction;
pub mod error;
pub mod sample;
pub mod schema;
pub mod suggestion;
pub mod template;

pub use assignment::{Assignment, SKIP_TOKEN, UNASSIGNED_TOKEN};
pub use correction::CorrectionRecord;
pub use error::{ModelError, Result};
pub use sample::{SampleData, SampleRow};
pub use schema::{TargetField, TargetSchema};
pub use suggestion::{FieldCandidate, SuggestionRequest, SuggestionResponse, candidate_score};
pub use template::MappingTemplate;
