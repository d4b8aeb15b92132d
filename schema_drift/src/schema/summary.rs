//! Drift summary counts

use serde::{Deserialize, Serialize};

use crate::schema::diff::SchemaDiff;
use crate::schema::types::CanonicalSchema;

/// Headline counts for one comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub total_tables_old: usize,
    pub total_tables_new: usize,
    pub added_table_count: usize,
    pub deleted_table_count: usize,
    pub modified_table_count: usize,
    pub added_column_count: usize,
    pub deleted_column_count: usize,
    pub modified_column_count: usize,
    pub renamed_column_count: usize,
}

impl DriftSummary {
    /// Count the changes in `diff`, computed from `old` and `new`
    pub fn from_diff(old: &CanonicalSchema, new: &CanonicalSchema, diff: &SchemaDiff) -> Self {
        let tables = diff.modified_tables.values();

        Self {
            total_tables_old: old.len(),
            total_tables_new: new.len(),
            added_table_count: diff.added_tables.len(),
            deleted_table_count: diff.deleted_tables.len(),
            modified_table_count: diff.modified_tables.len(),
            added_column_count: tables.clone().map(|t| t.added_columns.len()).sum(),
            deleted_column_count: tables.clone().map(|t| t.deleted_columns.len()).sum(),
            modified_column_count: tables.clone().map(|t| t.modified_columns.len()).sum(),
            renamed_column_count: tables.map(|t| t.renamed_columns.len()).sum(),
        }
    }

    pub fn has_drift(&self) -> bool {
        self.added_table_count
            + self.deleted_table_count
            + self.modified_table_count
            > 0
    }
}

impl std::fmt::Display for DriftSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tables (old / new):  {} / {}", self.total_tables_old, self.total_tables_new)?;
        writeln!(f, "Tables added:        {}", self.added_table_count)?;
        writeln!(f, "Tables deleted:      {}", self.deleted_table_count)?;
        writeln!(f, "Tables modified:     {}", self.modified_table_count)?;
        writeln!(f, "Columns added:       {}", self.added_column_count)?;
        writeln!(f, "Columns deleted:     {}", self.deleted_column_count)?;
        writeln!(f, "Columns modified:    {}", self.modified_column_count)?;
        write!(f, "Columns renamed:     {}", self.renamed_column_count)
    }
}
