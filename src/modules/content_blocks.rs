//! Content blocks module: reusable text fragments editable from the admin.

use crate::core::error::SetupError;
use crate::modules::{InstallParams, core_install};
use rusqlite::{Connection, params};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS content_blocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    title TEXT NOT NULL,
    text TEXT NOT NULL,
    hidden INTEGER NOT NULL DEFAULT 0,
    UNIQUE (language, title)
);
";

pub fn install(
    conn: &Connection,
    languages: &[String],
    _params: &InstallParams,
) -> Result<(), SetupError> {
    conn.execute_batch(SCHEMA)?;

    for language in languages {
        conn.execute(
            "INSERT INTO content_blocks (language, title, text, hidden)
             VALUES (?1, 'Example block', '<p>Example content block.</p>', 0)
             ON CONFLICT (language, title) DO UPDATE SET text = excluded.text",
            params![language],
        )?;
        for (application, kind, name, value) in [
            ("admin", "lbl", "ContentBlocks", "Content blocks"),
            ("admin", "msg", "BlockAdded", "The content block was added"),
        ] {
            core_install::insert_locale(
                conn,
                language,
                application,
                "content_blocks",
                kind,
                name,
                value,
            )?;
        }
    }
    Ok(())
}
