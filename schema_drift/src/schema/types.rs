//! Type definitions for the canonical schema model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalized description of a set of tables, independent of the source
/// format it was parsed from.
///
/// Table and column names are stored lowercase. Insertion order is kept for
/// display only: equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSchema {
    pub tables: IndexMap<String, Table>,
}

impl CanonicalSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the schema, replacing any table with the same
    /// (case-insensitive) name
    pub fn add_table(&mut self, name: &str, table: Table) {
        let name = name.to_lowercase();
        if self.tables.insert(name.clone(), table).is_some() {
            tracing::warn!(table = %name, "Duplicate table definition, later definition wins");
        }
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Iterate table names in insertion order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// An empty schema is how callers detect that nothing could be parsed
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Lowercase every table name, column name and type string.
    ///
    /// Used when a model arrives from outside the parser already in
    /// canonical shape.
    pub fn normalized(self) -> Self {
        let mut schema = Self::new();
        for (name, table) in self.tables {
            let mut normalized = Table::new();
            for (column, mut attrs) in table.columns {
                attrs.data_type = attrs.data_type.trim().to_lowercase();
                normalized.add_column(&column, attrs);
            }
            schema.add_table(&name, normalized);
        }
        schema
    }
}

/// The columns of one table, keyed by lowercase column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub columns: IndexMap<String, ColumnAttributes>,
}

impl Table {
    /// Create a new table with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the table, replacing any column with the same
    /// (case-insensitive) name
    pub fn add_column(&mut self, name: &str, attributes: ColumnAttributes) {
        let name = name.to_lowercase();
        if self.columns.insert(name.clone(), attributes).is_some() {
            tracing::warn!(column = %name, "Duplicate column definition, later definition wins");
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnAttributes> {
        self.columns.get(&name.to_lowercase())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnAttributes> {
        self.columns.get_mut(&name.to_lowercase())
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains_key(&name.to_lowercase())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Attributes tracked for every column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAttributes {
    /// Lowercase type text as written, e.g. `varchar(100)` or `decimal(10,2)`.
    /// Compared by exact text equality.
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnAttributes {
    /// Create a nullable, unconstrained column of the given type
    pub fn new(data_type: &str) -> Self {
        Self {
            data_type: data_type.trim().to_lowercase(),
            nullable: true,
            primary_key: false,
            unique: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set whether the column is part of the primary key
    pub fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Set whether the column is unique
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Value of a single attribute
    pub fn get(&self, attribute: ColumnAttribute) -> AttributeValue {
        match attribute {
            ColumnAttribute::Type => AttributeValue::Text(self.data_type.clone()),
            ColumnAttribute::Nullable => AttributeValue::Flag(self.nullable),
            ColumnAttribute::PrimaryKey => AttributeValue::Flag(self.primary_key),
            ColumnAttribute::Unique => AttributeValue::Flag(self.unique),
        }
    }
}

/// Names of the attributes in [`ColumnAttributes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAttribute {
    Type,
    Nullable,
    PrimaryKey,
    Unique,
}

impl ColumnAttribute {
    pub const ALL: [ColumnAttribute; 4] = [
        ColumnAttribute::Type,
        ColumnAttribute::Nullable,
        ColumnAttribute::PrimaryKey,
        ColumnAttribute::Unique,
    ];

    /// Attribute name as it appears in serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnAttribute::Type => "type",
            ColumnAttribute::Nullable => "nullable",
            ColumnAttribute::PrimaryKey => "primary_key",
            ColumnAttribute::Unique => "unique",
        }
    }
}

impl std::fmt::Display for ColumnAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value; serializes as a bare string or boolean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Text(String),
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Flag(value) => write!(f, "{}", value),
            AttributeValue::Text(value) => f.write_str(value),
        }
    }
}
