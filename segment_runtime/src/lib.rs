//! Shared runtime utilities for the segment map tools.
//!
//! This crate re-exports the data contracts from `segment_schema` and holds
//! helpers that operate on those types (command text parsing, the
//! export/import document and its validation) without depending on the
//! layout and rendering code in `mirror_core`.

pub use segment_schema::*;

mod command_text;
mod export_document;

pub use command_text::{parse_command_line, CommandParseError, ExportScope, InspectorCommand};
pub use export_document::{
    export_schema, ExportDocument, ExportValidationError, ExportedSegment, ValidatedExport,
};
