//! Library side of the `taxmap` command-line tool.

pub mod edits;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod upload;
