//! Configuration for the bookings dashboard

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants;

// =============================================================================
// File-based Configuration (dashboard.toml)
// =============================================================================

/// Configuration loaded from dashboard.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

/// Where the bookings live
#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    /// SQLite file holding the bookings table
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Bookings table name
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            table: default_table(),
        }
    }
}

/// Initial selections used when the command line leaves them out
#[derive(Debug, Deserialize)]
pub struct DefaultsSection {
    /// Year preselected when present in the data
    #[serde(default = "default_year")]
    pub year: i64,
    /// Agent preselected when present in the data
    #[serde(default)]
    pub agent: Option<String>,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            year: default_year(),
            agent: None,
        }
    }
}

fn default_database_path() -> PathBuf {
    PathBuf::from(constants::DATABASE_FILENAME)
}

fn default_table() -> String {
    constants::BOOKINGS_TABLE.to_string()
}

fn default_year() -> i64 {
    constants::DEFAULT_YEAR
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the config file if it exists, built-in defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| {
            "Failed to parse dashboard.toml. Check for:\n\
             - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
             - Incorrect data types (defaults.year must be an integer)"
        })
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Database settings with a validated table name
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub table: String,
}

/// Main configuration struct with validated values
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Year preselected when present in the data
    pub default_year: i64,
    /// Agent preselected when present in the data
    pub default_agent: Option<String>,
}

impl Config {
    /// Create config from file config and optional database path override
    pub fn from_file(file_config: &FileConfig, database: Option<PathBuf>) -> Result<Self> {
        let table = file_config.database.table.trim();
        // The table name is spliced into SQL text, so only plain identifiers pass
        if !is_plain_identifier(table) {
            anyhow::bail!(
                "Invalid table name '{}': use letters, digits and underscores only",
                file_config.database.table
            );
        }

        Ok(Self {
            database: DatabaseConfig {
                path: database.unwrap_or_else(|| file_config.database.path.clone()),
                table: table.to_string(),
            },
            default_year: file_config.defaults.year,
            default_agent: file_config
                .defaults
                .agent
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        })
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
