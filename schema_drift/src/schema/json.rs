//! JSON schema source parsing
//!
//! Accepts either a list of table objects:
//!
//! ```json
//! [{"table_name": "users",
//!   "columns": [{"name": "id", "type": "INT", "is_pk": true, "not_null": true, "unique": false}]}]
//! ```
//!
//! or a map already in canonical-model shape, as produced by serializing a
//! [`CanonicalSchema`].

use serde::Deserialize;
use serde_json::Value;

use crate::schema::parser::SourceParser;
use crate::schema::types::{CanonicalSchema, ColumnAttributes, Table};

/// A table entry in a JSON column list
#[derive(Debug, Deserialize)]
struct JsonTable {
    #[serde(default = "untitled_table")]
    table_name: String,
    #[serde(default)]
    columns: Vec<Value>,
}

/// A column entry in a JSON column list
#[derive(Debug, Deserialize)]
struct JsonColumn {
    #[serde(default = "untitled_col")]
    name: String,
    #[serde(rename = "type", default = "unknown_type")]
    data_type: String,
    #[serde(default, alias = "primary_key")]
    is_pk: bool,
    #[serde(default)]
    not_null: bool,
    #[serde(default)]
    unique: bool,
}

fn untitled_table() -> String {
    "untitled_table".to_string()
}

fn untitled_col() -> String {
    "untitled_col".to_string()
}

fn unknown_type() -> String {
    "unknown".to_string()
}

impl From<JsonColumn> for ColumnAttributes {
    fn from(column: JsonColumn) -> Self {
        ColumnAttributes::new(&column.data_type)
            .primary_key(column.is_pk)
            .nullable(!column.not_null)
            .unique(column.unique)
    }
}

/// Parser for JSON schema descriptions
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSource;

impl JsonSource {
    /// Build a schema from an already-parsed JSON document
    pub fn from_value(&self, value: Value) -> CanonicalSchema {
        match value {
            Value::Array(items) => Self::from_table_list(items),
            Value::Object(_) => match serde_json::from_value::<CanonicalSchema>(value) {
                Ok(schema) => schema.normalized(),
                Err(e) => {
                    tracing::warn!(error = %e, "JSON object is not a canonical schema model");
                    CanonicalSchema::new()
                }
            },
            other => {
                tracing::warn!(kind = json_kind(&other), "JSON schema input is neither a table list nor a schema map");
                CanonicalSchema::new()
            }
        }
    }

    fn from_table_list(items: Vec<Value>) -> CanonicalSchema {
        let mut schema = CanonicalSchema::new();

        for (index, item) in items.into_iter().enumerate() {
            let entry: JsonTable = match serde_json::from_value(item) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed table entry");
                    continue;
                }
            };

            let mut table = Table::new();
            for column in entry.columns {
                match serde_json::from_value::<JsonColumn>(column) {
                    Ok(column) => {
                        let name = column.name.clone();
                        table.add_column(&name, column.into());
                    }
                    Err(e) => {
                        tracing::warn!(table = %entry.table_name, error = %e, "Skipping malformed column entry");
                    }
                }
            }

            tracing::debug!(table = %entry.table_name, columns = table.len(), "Parsed JSON table");
            schema.add_table(&entry.table_name, table);
        }

        schema
    }
}

impl SourceParser for JsonSource {
    fn format_name(&self) -> &'static str {
        "json"
    }

    /// Returns `None` when the input is not JSON at all, so that another
    /// source format can be tried
    fn parse_source(&self, input: &str) -> Option<CanonicalSchema> {
        let value: Value = serde_json::from_str(input.trim()).ok()?;
        Some(self.from_value(value))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
