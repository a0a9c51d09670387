//! Tags module: schema only, sites start without tags.

use crate::core::error::SetupError;
use crate::modules::{InstallParams, core_install};
use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    tag TEXT NOT NULL,
    url TEXT NOT NULL,
    number INTEGER NOT NULL DEFAULT 0,
    UNIQUE (language, url)
);
";

pub fn install(
    conn: &Connection,
    languages: &[String],
    _params: &InstallParams,
) -> Result<(), SetupError> {
    conn.execute_batch(SCHEMA)?;

    for language in languages {
        for (application, kind, name, value) in [
            ("admin", "lbl", "Tags", "Tags"),
            ("public", "lbl", "Tags", "Tags"),
            ("public", "msg", "NoTags", "There are no tags yet"),
        ] {
            core_install::insert_locale(conn, language, application, "tags", kind, name, value)?;
        }
    }
    Ok(())
}
