//! Configuration handling for SchemaDrift

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    Config::from_toml_str(&config_str)
}

/// Represents the complete SchemaDrift configuration
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub diff: DiffConfig,
    pub logging: Option<LoggingConfig>,
    pub output: OutputConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        toml::from_str(config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))
    }
}

/// How column constraints are attributed in `CREATE TABLE` bodies
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintDetection {
    /// Each column's own modifiers, plus table-level `PRIMARY KEY (..)` and
    /// single-column `UNIQUE (..)` clauses
    #[default]
    Scoped,
    /// Keyword and column name both present anywhere in the table body.
    /// Can attribute one column's constraint to another.
    Block,
}

/// Schema parser configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    pub constraint_detection: ConstraintDetection,
}

/// Schema diff behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiffConfig {
    pub detect_renames: bool,
    /// Maximum edit distance between an old and a new column name for the
    /// pair to be considered a rename
    pub rename_threshold: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            detect_renames: true,
            rename_threshold: 2,
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stderr: bool,
    pub include_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            stderr: true,
            include_timestamps: true,
        }
    }
}

/// Output rendering for the command line tool
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Summary,
}

/// Output generation configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.parser.constraint_detection, ConstraintDetection::Scoped);
        assert!(config.diff.detect_renames);
        assert_eq!(config.diff.rename_threshold, 2);
        assert!(config.logging.is_none());
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_loading() {
        let config_str = r###"
        [parser]
        constraint_detection = "block"

        [diff]
        rename_threshold = 3

        [logging]
        level = "debug"
        format = "json"

        [output]
        format = "summary"
        pretty = false
        "###;

        let config = Config::from_toml_str(config_str).unwrap();

        assert_eq!(config.parser.constraint_detection, ConstraintDetection::Block);
        assert_eq!(config.diff.rename_threshold, 3);
        assert!(config.diff.detect_renames);

        let logging = config.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, "json");
        assert!(logging.stderr);
        assert!(logging.file.is_none());

        assert_eq!(config.output.format, OutputFormat::Summary);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_unknown_detection_mode_is_rejected() {
        let result = Config::from_toml_str("[parser]\nconstraint_detection = \"fuzzy\"\n");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[diff]\ndetect_renames = false").unwrap();

        let config = load_from_file(file.path()).unwrap();
        assert!(!config.diff.detect_renames);
        assert_eq!(config.diff.rename_threshold, 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from_file(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }
}
