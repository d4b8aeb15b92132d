//! Schema module for SchemaDrift
//!
//! This module handles schema source parsing, comparison, and summaries.

pub mod diff;
pub mod json;
pub mod parser;
pub mod rename;
pub mod sql;
pub mod summary;
pub mod types;

// Re-export key types
pub use diff::{AttributeChange, SchemaDiff, TableDiff};
pub use parser::{SchemaParser, SourceParser};
pub use rename::{ColumnRename, RenameMatcher};
pub use summary::DriftSummary;
pub use types::{AttributeValue, CanonicalSchema, ColumnAttribute, ColumnAttributes, Table};
