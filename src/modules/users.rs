//! Users module: account schema and the initial administrator.

use crate::core::error::SetupError;
use crate::core::time;
use crate::modules::{InstallParams, core_install};
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    added_on TEXT NOT NULL
);
";

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

pub fn install(
    conn: &Connection,
    languages: &[String],
    params: &InstallParams,
) -> Result<(), SetupError> {
    let password = params
        .admin_password
        .as_deref()
        .ok_or_else(|| SetupError::MissingState("admin password".to_string()))?;

    conn.execute_batch(SCHEMA)?;

    conn.execute(
        "INSERT INTO users (email, password_hash, is_admin, added_on)
         VALUES (?1, ?2, 1, ?3)
         ON CONFLICT (email) DO UPDATE SET password_hash = excluded.password_hash",
        params![params.debug_email, hash_password(password), time::now_epoch_z()],
    )?;

    for language in languages {
        for (application, kind, name, value) in [
            ("admin", "lbl", "Email", "E-mail address"),
            ("admin", "lbl", "Password", "Password"),
            ("admin", "err", "EmailInvalid", "This is an invalid e-mail address"),
            ("admin", "msg", "UserAdded", "The user was added"),
            ("public", "msg", "LoggedOut", "You are logged out"),
        ] {
            core_install::insert_locale(conn, language, application, "users", kind, name, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::core_install;

    fn params() -> InstallParams {
        InstallParams {
            debug_email: "dev@example.test".to_string(),
            admin_password: Some("secret".to_string()),
            ..InstallParams::default()
        }
    }

    fn prepared_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        core_install::install(&conn, &["en".to_string()], &params()).expect("core");
        conn
    }

    #[test]
    fn seeds_a_single_administrator_account() {
        let conn = prepared_conn();
        install(&conn, &["en".to_string()], &params()).expect("install");

        let (email, is_admin, hash): (String, i64, String) = conn
            .query_row(
                "SELECT email, is_admin, password_hash FROM users",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("admin row");
        assert_eq!(email, "dev@example.test");
        assert_eq!(is_admin, 1);
        assert_eq!(hash, hash_password("secret"));
        assert_ne!(hash, "secret");
    }

    #[test]
    fn reinstall_keeps_one_account_and_refreshes_the_hash() {
        let conn = prepared_conn();
        install(&conn, &["en".to_string()], &params()).expect("first");

        let mut changed = params();
        changed.admin_password = Some("rotated".to_string());
        install(&conn, &["en".to_string()], &changed).expect("second");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
        let hash: String = conn
            .query_row("SELECT password_hash FROM users", [], |row| row.get(0))
            .expect("hash");
        assert_eq!(hash, hash_password("rotated"));
    }

    #[test]
    fn missing_admin_password_is_an_error() {
        let conn = prepared_conn();
        let mut no_password = params();
        no_password.admin_password = None;
        let err = install(&conn, &["en".to_string()], &no_password).expect_err("must fail");
        assert!(matches!(err, SetupError::MissingState(_)));
    }
}
