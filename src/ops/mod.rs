//! High-level operations.
//!
//! This module contains the implementation of snd-recipe commands.

pub mod create;
pub mod export;
pub mod inspect;

pub use create::{create, install_root, CreateOptions, CreateResult, CONSUMER_INFO_FILE};
pub use export::{export, ExportResult, CONTENT_MANIFEST, EXPORT_SOURCE_DIR};
pub use inspect::{inspect, InspectReport};
