//! Embedded schema data.
//!
//! Target fields for the built-in report types are compiled into the binary
//! with `include_str!()` so the engine works offline.

/// Built-in target fields for every supported report type.
pub const TARGET_FIELDS: &str = include_str!("../data/target_fields.csv");
