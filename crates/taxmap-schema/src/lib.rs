//! Target schema provider.
//!
//! Supplies the ordered target fields for a report type. Built-in schemas are
//! embedded; deployments can point at an override CSV with the same columns:
//! `Report Type, Field Order, Field Key, Field Label, Group`.

pub mod embedded;
pub mod error;
pub mod loader;

pub use error::{Result, SchemaError};
pub use loader::{find_schema, load, load_from_path, load_from_str, schema_for};
