use std::{env, path::PathBuf};

/// Default path of the persistent database file.
pub const DEFAULT_SQLITE_PATH: &str = "Database.db";

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the persistent SQLite database file (default: "Database.db")
    pub sqlite_path: PathBuf,
    /// Keep a full in-memory mirror and serve reads from it (default: true)
    pub hold_data_in_memory: bool,
}

impl Config {
    /// Creates a configuration for the database at `path`, with the memory mirror on.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            sqlite_path: path.into(),
            hold_data_in_memory: true,
        }
    }

    /// Enables or disables the in-memory mirror.
    pub fn with_memory_mirror(mut self, enabled: bool) -> Self {
        self.hold_data_in_memory = enabled;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `QUICKSQL_PATH` - SQLite database path (default: "Database.db")
    /// - `QUICKSQL_HOLD_IN_MEMORY` - `true`/`false` (default: true)
    pub fn from_env() -> Self {
        Self {
            sqlite_path: env::var("QUICKSQL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SQLITE_PATH)),
            hold_data_in_memory: env::var("QUICKSQL_HOLD_IN_MEMORY")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
