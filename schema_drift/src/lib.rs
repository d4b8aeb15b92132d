//! SchemaDrift: structural drift detection between two schema versions
//!
//! SchemaDrift parses two schema descriptions (SQL `CREATE TABLE` statements
//! or a JSON column list) into a canonical model and reports what changed
//! between them: tables added and deleted, and per table the columns added,
//! deleted, modified, or renamed.
//!
//! ```
//! let old = schema_drift::parse("CREATE TABLE users (id INT PRIMARY KEY, username VARCHAR(50));");
//! let new = schema_drift::parse("CREATE TABLE users (id INT PRIMARY KEY, user_name VARCHAR(50));");
//!
//! let diff = schema_drift::diff(&old, &new);
//! assert_eq!(diff.modified_tables["users"].renamed_columns["username"].new_name, "user_name");
//! ```

pub mod config;
pub mod error;
pub mod schema;
pub mod utils;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use schema::diff::{SchemaDiff, TableDiff};
pub use schema::parser::SchemaParser;
pub use schema::summary::DriftSummary;
pub use schema::types::{CanonicalSchema, ColumnAttributes};

/// Initialize SchemaDrift with the specified configuration file
pub fn init(config_path: impl AsRef<Path>) -> Result<DriftAnalyzer> {
    let config = config::load_from_file(config_path)?;
    utils::logging::init_logging(&config.logging)?;
    Ok(DriftAnalyzer::new(config))
}

/// Parse a schema description with the default configuration
pub fn parse(schema_text: &str) -> CanonicalSchema {
    DriftAnalyzer::default().parse(schema_text)
}

/// Diff two schemas with the default configuration
pub fn diff(old: &CanonicalSchema, new: &CanonicalSchema) -> SchemaDiff {
    DriftAnalyzer::default().diff(old, new)
}

/// The full result of comparing two schema sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub old: CanonicalSchema,
    pub new: CanonicalSchema,
    pub diff: SchemaDiff,
    pub summary: DriftSummary,
}

impl DriftReport {
    pub fn has_drift(&self) -> bool {
        !self.diff.is_empty()
    }
}

/// Summary counts followed by one section per modified table
impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;

        if !self.diff.added_tables.is_empty() || !self.diff.deleted_tables.is_empty() {
            writeln!(f)?;
        }
        if !self.diff.added_tables.is_empty() {
            write!(f, "\nAdded tables: {}", self.diff.added_tables.join(", "))?;
        }
        if !self.diff.deleted_tables.is_empty() {
            write!(f, "\nDeleted tables: {}", self.diff.deleted_tables.join(", "))?;
        }

        for (table, changes) in &self.diff.modified_tables {
            write!(f, "\n\n[{}]", table)?;
            for column in &changes.added_columns {
                write!(f, "\n  + {}", column)?;
            }
            for column in &changes.deleted_columns {
                write!(f, "\n  - {}", column)?;
            }
            for (old_name, rename) in &changes.renamed_columns {
                write!(
                    f,
                    "\n  ~ {} -> {} ({} -> {})",
                    old_name, rename.new_name, rename.old_type, rename.new_type
                )?;
            }
            for (column, attributes) in &changes.modified_columns {
                for (attribute, change) in attributes {
                    write!(
                        f,
                        "\n  * {}.{}: {} -> {}",
                        column, attribute, change.old_value, change.new_value
                    )?;
                }
            }
        }

        Ok(())
    }
}

/// The main entry point for parsing and comparing schemas
#[derive(Debug, Clone, Default)]
pub struct DriftAnalyzer {
    config: Config,
    parser: SchemaParser,
}

impl DriftAnalyzer {
    /// Create a new analyzer from configuration
    pub fn new(config: Config) -> Self {
        let parser = SchemaParser::new(&config.parser);
        Self { config, parser }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse one schema description into its canonical model
    pub fn parse(&self, schema_text: &str) -> CanonicalSchema {
        self.parser.parse(schema_text)
    }

    /// Diff two canonical models
    pub fn diff(&self, old: &CanonicalSchema, new: &CanonicalSchema) -> SchemaDiff {
        SchemaDiff::generate(old, new, &self.config.diff)
    }

    /// Complete workflow: parse both sources, diff them and summarize
    pub fn compare(&self, old_text: &str, new_text: &str) -> DriftReport {
        let old = self.parse(old_text);
        let new = self.parse(new_text);

        match (old.is_empty(), new.is_empty()) {
            (true, true) => tracing::warn!("Neither schema could be parsed"),
            (true, false) => tracing::warn!("Old schema could not be parsed; every table will be reported as added"),
            (false, true) => tracing::warn!("New schema could not be parsed; every table will be reported as deleted"),
            (false, false) => {}
        }

        let diff = self.diff(&old, &new);
        let summary = DriftSummary::from_diff(&old, &new, &diff);

        if diff.is_empty() {
            tracing::info!("Schemas are in sync");
        }

        DriftReport {
            old,
            new,
            diff,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_report_display() {
        let report = DriftAnalyzer::default().compare(
            "CREATE TABLE users (id INT, username TEXT, age INT); CREATE TABLE legacy (id INT);",
            "CREATE TABLE users (id BIGINT, user_name TEXT, email TEXT); CREATE TABLE orders (id INT);",
        );

        let expected = "\
Tables (old / new):  2 / 2
Tables added:        1
Tables deleted:      1
Tables modified:     1
Columns added:       1
Columns deleted:     1
Columns modified:    1
Columns renamed:     1

Added tables: orders
Deleted tables: legacy

[users]
  + email
  - age
  ~ username -> user_name (text -> text)
  * id.type: int -> bigint";

        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_report_display_without_drift() {
        let report = DriftAnalyzer::default().compare("CREATE TABLE t (id INT);", "CREATE TABLE t (id INT);");

        assert!(!report.has_drift());
        assert!(report.to_string().ends_with("Columns renamed:     0"));
        assert!(!report.to_string().contains('['));
    }

    // The only test in this binary that installs a global subscriber
    #[test]
    fn test_init_loads_config_and_installs_logging() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("logs").join("drift.log");
        let config_path = dir.path().join("drift.toml");
        fs::write(
            &config_path,
            format!(
                r#"
                [diff]
                rename_threshold = 3

                [logging]
                level = "debug"
                format = "json"
                file = "{}"
                stderr = false
                include_timestamps = false
                "#,
                log_path.display().to_string().replace('\\', "/")
            ),
        )
        .unwrap();

        let analyzer = init(&config_path).unwrap();
        assert_eq!(analyzer.config().diff.rename_threshold, 3);
        assert!(log_path.exists());

        tracing::info!(run = "init-test", tables = 2, "Logging installed");
        tracing::debug!(run = "init-test", "Debug level enabled");

        let logged = fs::read_to_string(&log_path).unwrap();
        let events: Vec<serde_json::Value> = logged
            .lines()
            .filter(|line| line.contains("init-test"))
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["level"], "INFO");
        assert_eq!(events[0]["fields"]["message"], "Logging installed");
        assert_eq!(events[0]["fields"]["tables"], 2);
        assert_eq!(events[1]["level"], "DEBUG");
        assert!(events[0].get("timestamp").is_none());

        let second = init(&config_path);
        assert!(matches!(second, Err(Error::LoggingError(_))));
    }

    #[test]
    fn test_init_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = init(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
