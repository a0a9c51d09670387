//! Base-system installation: shared schema and site-wide settings.
//!
//! Owns the two tables every other unit writes into: the locale table
//! (translation rows consumed by the generated lookup artifacts) and the
//! module settings table. Every statement here is idempotent so a re-run
//! after a partial apply converges instead of failing.

use crate::core::error::SetupError;
use crate::modules::InstallParams;
use rusqlite::{Connection, params};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locale (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    application TEXT NOT NULL,
    module TEXT NOT NULL,
    type TEXT NOT NULL CHECK (type IN ('act', 'err', 'lbl', 'msg')),
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    UNIQUE (language, application, module, type, name)
);

CREATE TABLE IF NOT EXISTS modules_settings (
    module TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (module, name)
);
";

/// Store one module setting, overwriting any previous value.
pub(crate) fn set_setting(
    conn: &Connection,
    module: &str,
    name: &str,
    value: &str,
) -> Result<(), SetupError> {
    conn.execute(
        "INSERT INTO modules_settings (module, name, value) VALUES (?1, ?2, ?3)
         ON CONFLICT (module, name) DO UPDATE SET value = excluded.value",
        params![module, name, value],
    )?;
    Ok(())
}

/// Insert one translation row, overwriting any previous value for the same
/// (language, application, module, type, name) key.
pub(crate) fn insert_locale(
    conn: &Connection,
    language: &str,
    application: &str,
    module: &str,
    kind: &str,
    name: &str,
    value: &str,
) -> Result<(), SetupError> {
    conn.execute(
        "INSERT INTO locale (language, application, module, type, name, value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (language, application, module, type, name)
         DO UPDATE SET value = excluded.value",
        params![language, application, module, kind, name, value],
    )?;
    Ok(())
}

/// Seeded base-system translations: (application, type, name, value).
/// Seed data is language-neutral placeholder copy; operators localize later
/// through the locale module.
const LOCALE_SEED: &[(&str, &str, &str, &str)] = &[
    ("admin", "lbl", "Save", "Save"),
    ("admin", "lbl", "Cancel", "Cancel"),
    ("admin", "lbl", "Dashboard", "Dashboard"),
    ("admin", "lbl", "Settings", "Settings"),
    ("admin", "err", "SomethingWentWrong", "Something went wrong"),
    ("admin", "err", "FieldIsRequired", "This field is required"),
    ("admin", "msg", "Saved", "The changes were saved"),
    ("admin", "act", "Edit", "edit"),
    ("public", "lbl", "Home", "Home"),
    ("public", "lbl", "Send", "Send"),
    ("public", "err", "SomethingWentWrong", "Something went wrong"),
    ("public", "msg", "Welcome", "Welcome"),
];

pub fn install(
    conn: &Connection,
    languages: &[String],
    params: &InstallParams,
) -> Result<(), SetupError> {
    conn.execute_batch(SCHEMA)?;

    set_setting(conn, "core", "site_title", &params.site_title)?;
    set_setting(conn, "core", "site_domain", &params.site_domain)?;
    set_setting(conn, "core", "default_language", &params.default_language)?;
    set_setting(conn, "core", "languages", &serde_json::to_string(languages)?)?;
    set_setting(conn, "core", "debug_email", &params.debug_email)?;
    set_setting(conn, "core", "api_email", &params.api_email)?;
    set_setting(conn, "core", "smtp_server", &params.smtp_server)?;
    set_setting(conn, "core", "smtp_port", &params.smtp_port)?;
    set_setting(conn, "core", "smtp_username", &params.smtp_username)?;
    set_setting(conn, "core", "smtp_password", &params.smtp_password)?;

    for language in languages {
        for (application, kind, name, value) in LOCALE_SEED {
            insert_locale(conn, language, application, "core", kind, name, value)?;
        }
    }
    Ok(())
}
