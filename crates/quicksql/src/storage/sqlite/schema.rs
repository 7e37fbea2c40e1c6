//! SQLite schema definition and SQL statement constants.
//!
//! Pure data, no I/O.

/// SQL statement to create the key-value table.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS json (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

pub const SELECT_VALUE_BY_KEY: &str = r#"
SELECT value
FROM json
WHERE key = ?1
"#;

pub const SELECT_ALL: &str = r#"
SELECT key, value
FROM json
"#;

pub const UPSERT: &str = r#"
INSERT OR REPLACE INTO json (key, value)
VALUES (?1, ?2)
"#;

pub const DELETE_BY_KEY: &str = r#"
DELETE FROM json
WHERE key = ?1
"#;

pub const DELETE_ALL: &str = r#"
DELETE FROM json
"#;
