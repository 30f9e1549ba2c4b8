//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Every shard file carries the same single table.

/// Creates the users table if it does not exist yet.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT,
    payload TEXT
)
"#;

/// Insert-or-ignore: a duplicate id leaves the existing row untouched.
pub const INSERT_USER_IF_ABSENT: &str = r#"
INSERT OR IGNORE INTO users (id, username, payload)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT username, payload
FROM users
WHERE id = ?1
"#;

pub const SELECT_JOURNAL_MODE: &str = "PRAGMA journal_mode";

/// Folds the WAL back into the main database file and truncates it.
pub const CHECKPOINT_TRUNCATE: &str = "PRAGMA wal_checkpoint(TRUNCATE)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_defines_users_only() {
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(CREATE_TABLES.contains("id INTEGER PRIMARY KEY"));
        assert_eq!(CREATE_TABLES.matches("CREATE").count(), 1);
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        assert!(INSERT_USER_IF_ABSENT.contains("INSERT OR IGNORE"));
        assert!(!INSERT_USER_IF_ABSENT.contains("REPLACE"));
    }

    #[test]
    fn test_select_filters_by_id() {
        assert!(SELECT_USER_BY_ID.contains("WHERE id = ?1"));
    }
}
