//! Schema source parser
//!
//! Turns schema-source text (a JSON document or SQL DDL) into a
//! [`CanonicalSchema`]. Parsing never fails: input that cannot be understood
//! produces an empty schema, and callers check [`CanonicalSchema::is_empty`]
//! to detect that.

use crate::config::ParserConfig;
use crate::schema::json::JsonSource;
use crate::schema::sql::SqlSource;
use crate::schema::types::CanonicalSchema;

/// A schema source format
pub trait SourceParser {
    /// Short name used in log output
    fn format_name(&self) -> &'static str;

    /// Parse `input`, or return `None` if it is not in this format at all
    fn parse_source(&self, input: &str) -> Option<CanonicalSchema>;
}

/// Schema parser that detects the source format
#[derive(Debug, Clone, Default)]
pub struct SchemaParser {
    json: JsonSource,
    sql: SqlSource,
}

impl SchemaParser {
    /// Create a new schema parser
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            json: JsonSource,
            sql: SqlSource::new(config.constraint_detection),
        }
    }

    /// Parse a schema description.
    ///
    /// JSON is tried first; anything that is not valid JSON is treated as
    /// SQL.
    pub fn parse(&self, schema_text: &str) -> CanonicalSchema {
        let sources: [&dyn SourceParser; 2] = [&self.json, &self.sql];

        for source in sources {
            if let Some(schema) = source.parse_source(schema_text) {
                tracing::debug!(
                    format = source.format_name(),
                    tables = schema.len(),
                    "Parsed schema source"
                );
                return schema;
            }
        }

        CanonicalSchema::new()
    }
}
