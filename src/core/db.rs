//! Database access for the provisioning pipeline.
//!
//! One connection discipline for every consumer: busy timeout, WAL journal
//! and foreign keys on. Also home to the two schema-level contracts the
//! pipeline needs beyond plain execute/query: the DDL round-trip probe used
//! to vet captured credentials, and discovery of the declared value set of
//! an enumerated column.

use crate::core::error::SetupError;
use regex::Regex;
use rusqlite::Connection;
use std::path::Path;

/// Open a connection with the standard pragmas applied.
pub fn connect(db_path: &Path) -> Result<Connection, SetupError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
    conn.execute("PRAGMA foreign_keys=ON;", [])?;
    Ok(conn)
}

/// Prove DDL privileges on the target database with a create/drop round
/// trip. Failure is a recoverable validation signal, not a fatal error;
/// the caller decides how to surface it.
pub fn probe_ddl(db_path: &Path) -> Result<(), SetupError> {
    let conn = connect(db_path)?;
    conn.execute("DROP TABLE IF EXISTS siteprep_probe;", [])?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS siteprep_probe (id INTEGER NOT NULL);",
        [],
    )?;
    conn.execute("DROP TABLE siteprep_probe;", [])?;
    Ok(())
}

/// Enumerate the declared value set of an enumerated column.
///
/// SQLite has no ENUM type; by convention an enumerated column declares a
/// `CHECK (<column> IN ('a', 'b', ...))` clause, and that clause is the
/// authority — an empty table still yields the full set. The declaration is
/// read back from `sqlite_master`.
pub fn enum_values(
    conn: &Connection,
    table: &str,
    column: &str,
) -> Result<Vec<String>, SetupError> {
    let sql: String = conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;

    let pattern = format!(
        r"(?is)CHECK\s*\(\s*{}\s+IN\s*\(([^)]*)\)",
        regex::escape(column)
    );
    let re = Regex::new(&pattern).map_err(|e| {
        SetupError::MissingDependency(format!("enum discovery pattern failed to compile: {e}"))
    })?;
    let captures = re.captures(&sql).ok_or_else(|| {
        SetupError::MissingState(format!(
            "column '{column}' of table '{table}' declares no enumerated value set"
        ))
    })?;

    let values = captures[1]
        .split(',')
        .map(|part| part.trim().trim_matches('\'').to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn probe_ddl_round_trips_on_a_writable_database() {
        let tmp = TempDir::new().expect("tempdir");
        let db = tmp.path().join("probe.sqlite");
        probe_ddl(&db).expect("probe must pass");
        // The probe table must not survive the round trip.
        let conn = connect(&db).expect("connect");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'siteprep_probe'",
                [],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn probe_ddl_fails_when_the_path_cannot_hold_a_database() {
        let tmp = TempDir::new().expect("tempdir");
        // A directory where the database file should be.
        let db = tmp.path().join("blocked.sqlite");
        std::fs::create_dir(&db).expect("create blocker");
        assert!(probe_ddl(&db).is_err());
    }

    #[test]
    fn enum_values_reads_the_declared_set_from_the_schema() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE locale (
                type TEXT NOT NULL CHECK (type IN ('act', 'err', 'lbl', 'msg')),
                name TEXT NOT NULL
            );",
        )
        .expect("create");
        let values = enum_values(&conn, "locale", "type").expect("enum values");
        assert_eq!(values, vec!["act", "err", "lbl", "msg"]);
    }

    #[test]
    fn enum_values_works_on_an_empty_table() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(
            "CREATE TABLE locale (
                type TEXT NOT NULL CHECK (type IN ('err','lbl')),
                name TEXT NOT NULL
            );",
        )
        .expect("create");
        let values = enum_values(&conn, "locale", "type").expect("enum values");
        assert_eq!(values, vec!["err", "lbl"]);
    }

    #[test]
    fn enum_values_rejects_a_column_without_a_declared_set() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch("CREATE TABLE plain (name TEXT NOT NULL);")
            .expect("create");
        assert!(enum_values(&conn, "plain", "name").is_err());
    }
}
