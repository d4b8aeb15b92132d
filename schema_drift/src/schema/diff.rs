//! Schema difference calculator
//!
//! This module compares two canonical schemas and calculates the differences,
//! inferring column renames along the way.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::DiffConfig;
use crate::schema::rename::{ColumnRename, RenameMatcher};
use crate::schema::types::{AttributeValue, CanonicalSchema, ColumnAttribute, Table};

/// Structural differences between an old and a new schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Tables only in the new schema, in new-schema order
    pub added_tables: Vec<String>,
    /// Tables only in the old schema, in old-schema order
    pub deleted_tables: Vec<String>,
    /// Tables in both schemas with at least one change. Unchanged tables
    /// never appear here.
    pub modified_tables: IndexMap<String, TableDiff>,
}

/// Column-level changes within one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    pub added_columns: Vec<String>,
    pub deleted_columns: Vec<String>,
    /// Keyed by old column name
    pub renamed_columns: IndexMap<String, ColumnRename>,
    /// Same-name columns whose attributes differ, with only the differing
    /// attributes listed
    pub modified_columns: IndexMap<String, IndexMap<ColumnAttribute, AttributeChange>>,
}

/// Old and new value of one column attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub old_value: AttributeValue,
    pub new_value: AttributeValue,
}

impl SchemaDiff {
    /// Generate a schema diff between two schemas
    pub fn generate(old: &CanonicalSchema, new: &CanonicalSchema, config: &DiffConfig) -> Self {
        // Tables to add (in new but not in old)
        let added_tables = new
            .table_names()
            .filter(|name| !old.contains_table(name))
            .map(str::to_string)
            .collect();

        // Tables to delete (in old but not in new)
        let deleted_tables = old
            .table_names()
            .filter(|name| !new.contains_table(name))
            .map(str::to_string)
            .collect();

        let matcher = config.detect_renames.then(|| RenameMatcher::new(config.rename_threshold));

        let mut modified_tables = IndexMap::new();
        for (table_name, old_table) in &old.tables {
            if let Some(new_table) = new.tables.get(table_name) {
                let table_diff = TableDiff::generate(old_table, new_table, matcher.as_ref());
                if !table_diff.is_empty() {
                    modified_tables.insert(table_name.clone(), table_diff);
                }
            }
        }

        let diff = Self {
            added_tables,
            deleted_tables,
            modified_tables,
        };

        tracing::info!(
            added_tables = diff.added_tables.len(),
            deleted_tables = diff.deleted_tables.len(),
            modified_tables = diff.modified_tables.len(),
            "Schema diff generated"
        );

        diff
    }

    /// Check if the diff is empty (no drift)
    pub fn is_empty(&self) -> bool {
        self.added_tables.is_empty()
            && self.deleted_tables.is_empty()
            && self.modified_tables.is_empty()
    }

    /// Total number of table- and column-level changes
    pub fn change_count(&self) -> usize {
        self.added_tables.len()
            + self.deleted_tables.len()
            + self
                .modified_tables
                .values()
                .map(TableDiff::change_count)
                .sum::<usize>()
    }
}

impl TableDiff {
    /// Compare the columns of one table present in both schemas.
    ///
    /// Renames are only inferred when a matcher is given.
    pub fn generate(old: &Table, new: &Table, matcher: Option<&RenameMatcher>) -> Self {
        let deleted: Vec<String> = old
            .column_names()
            .filter(|name| !new.contains_column(name))
            .map(str::to_string)
            .collect();

        let added: Vec<String> = new
            .column_names()
            .filter(|name| !old.contains_column(name))
            .map(str::to_string)
            .collect();

        let (renamed_columns, deleted_columns, added_columns) = match matcher {
            Some(matcher) => {
                let matches = matcher.match_columns(deleted, added, old, new);
                (matches.renamed, matches.deleted, matches.added)
            }
            None => (IndexMap::new(), deleted, added),
        };

        // Renamed columns exist on one side only, so only shared names reach
        // the attribute comparison
        let mut modified_columns = IndexMap::new();
        for (name, old_attrs) in &old.columns {
            let Some(new_attrs) = new.columns.get(name) else {
                continue;
            };

            let changes: IndexMap<ColumnAttribute, AttributeChange> = ColumnAttribute::ALL
                .into_iter()
                .filter_map(|attribute| {
                    let old_value = old_attrs.get(attribute);
                    let new_value = new_attrs.get(attribute);
                    (old_value != new_value).then(|| (attribute, AttributeChange { old_value, new_value }))
                })
                .collect();

            if !changes.is_empty() {
                modified_columns.insert(name.clone(), changes);
            }
        }

        Self {
            added_columns,
            deleted_columns,
            renamed_columns,
            modified_columns,
        }
    }

    /// Check if no column changed
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.deleted_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.modified_columns.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added_columns.len()
            + self.deleted_columns.len()
            + self.renamed_columns.len()
            + self.modified_columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::ColumnAttributes;
    use pretty_assertions::assert_eq;

    fn schema(tables: Vec<(&str, Vec<(&str, ColumnAttributes)>)>) -> CanonicalSchema {
        let mut schema = CanonicalSchema::new();
        for (name, columns) in tables {
            let mut table = Table::new();
            for (column, attrs) in columns {
                table.add_column(column, attrs);
            }
            schema.add_table(name, table);
        }
        schema
    }

    #[test]
    fn test_attribute_changes_are_listed_individually() {
        let old = schema(vec![("t", vec![("id", ColumnAttributes::new("int").nullable(false))])]);
        let new = schema(vec![(
            "t",
            vec![("id", ColumnAttributes::new("bigint").nullable(false).unique(true))],
        )]);

        let diff = SchemaDiff::generate(&old, &new, &DiffConfig::default());
        let changes = &diff.modified_tables["t"].modified_columns["id"];

        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes[&ColumnAttribute::Type],
            AttributeChange {
                old_value: AttributeValue::Text("int".to_string()),
                new_value: AttributeValue::Text("bigint".to_string()),
            }
        );
        assert_eq!(
            changes[&ColumnAttribute::Unique],
            AttributeChange {
                old_value: AttributeValue::Flag(false),
                new_value: AttributeValue::Flag(true),
            }
        );
    }

    #[test]
    fn test_rename_and_shared_column_changes_are_separate() {
        let old = schema(vec![(
            "t",
            vec![
                ("id", ColumnAttributes::new("int")),
                ("username", ColumnAttributes::new("varchar(50)")),
            ],
        )]);
        let new = schema(vec![(
            "t",
            vec![
                ("id", ColumnAttributes::new("int").primary_key(true)),
                ("user_name", ColumnAttributes::new("varchar(80)").nullable(false)),
            ],
        )]);

        let diff = SchemaDiff::generate(&old, &new, &DiffConfig::default());
        let table = &diff.modified_tables["t"];

        assert_eq!(table.renamed_columns["username"].new_name, "user_name");
        assert_eq!(table.modified_columns.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(
            table.modified_columns["id"].keys().collect::<Vec<_>>(),
            vec![&ColumnAttribute::PrimaryKey]
        );
        assert!(table.added_columns.is_empty());
        assert!(table.deleted_columns.is_empty());
    }

    #[test]
    fn test_rename_detection_can_be_disabled() {
        let old = schema(vec![("t", vec![("username", ColumnAttributes::new("text"))])]);
        let new = schema(vec![("t", vec![("usernam", ColumnAttributes::new("text"))])]);

        let config = DiffConfig {
            detect_renames: false,
            ..DiffConfig::default()
        };
        let diff = SchemaDiff::generate(&old, &new, &config);
        let table = &diff.modified_tables["t"];

        assert!(table.renamed_columns.is_empty());
        assert_eq!(table.deleted_columns, vec!["username"]);
        assert_eq!(table.added_columns, vec!["usernam"]);
    }

    #[test]
    fn test_column_order_follows_schemas() {
        let old = schema(vec![(
            "t",
            vec![
                ("zeta", ColumnAttributes::new("int")),
                ("alpha", ColumnAttributes::new("int")),
            ],
        )]);
        let new = schema(vec![(
            "t",
            vec![
                ("yankee_doodle", ColumnAttributes::new("text")),
                ("bravo_charlie", ColumnAttributes::new("text")),
            ],
        )]);

        let diff = SchemaDiff::generate(&old, &new, &DiffConfig::default());
        let table = &diff.modified_tables["t"];

        assert_eq!(table.deleted_columns, vec!["zeta", "alpha"]);
        assert_eq!(table.added_columns, vec!["yankee_doodle", "bravo_charlie"]);
        assert_eq!(diff.change_count(), 4);
    }

    #[test]
    fn test_serialized_shape() {
        let old = schema(vec![
            ("users", vec![("email", ColumnAttributes::new("varchar(100)"))]),
            ("legacy", vec![]),
        ]);
        let new = schema(vec![
            ("users", vec![("emails", ColumnAttributes::new("varchar(120)"))]),
            ("orders", vec![]),
        ]);

        let diff = SchemaDiff::generate(&old, &new, &DiffConfig::default());
        let value = serde_json::to_value(&diff).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "added_tables": ["orders"],
                "deleted_tables": ["legacy"],
                "modified_tables": {
                    "users": {
                        "added_columns": [],
                        "deleted_columns": [],
                        "renamed_columns": {
                            "email": {
                                "new_name": "emails",
                                "old_type": "varchar(100)",
                                "new_type": "varchar(120)"
                            }
                        },
                        "modified_columns": {}
                    }
                }
            })
        );

        let back: SchemaDiff = serde_json::from_value(value).unwrap();
        assert_eq!(back, diff);
    }
}
