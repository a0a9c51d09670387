//! Pages module: page tree schema and the seed pages every site starts with.

use crate::core::error::SetupError;
use crate::modules::{InstallParams, core_install};
use rusqlite::{Connection, params};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    hidden INTEGER NOT NULL DEFAULT 0,
    UNIQUE (language, title)
);
";

/// (title, body, hidden) seeded for every chosen language.
const PAGE_SEED: &[(&str, &str, i64)] = &[
    ("Home", "<p>Welcome to your new website.</p>", 0),
    ("Sitemap", "<p>Overview of all pages.</p>", 0),
    ("404", "<p>The page you requested does not exist.</p>", 1),
];

pub fn install(
    conn: &Connection,
    languages: &[String],
    _params: &InstallParams,
) -> Result<(), SetupError> {
    conn.execute_batch(SCHEMA)?;

    for language in languages {
        for (title, body, hidden) in PAGE_SEED {
            conn.execute(
                "INSERT INTO pages (language, title, body, hidden)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (language, title) DO UPDATE SET body = excluded.body",
                params![language, title, body, hidden],
            )?;
        }
        for (application, kind, name, value) in [
            ("admin", "lbl", "Pages", "Pages"),
            ("admin", "msg", "PageAdded", "The page was added"),
            ("public", "lbl", "GoToPage", "Go to page"),
        ] {
            core_install::insert_locale(conn, language, application, "pages", kind, name, value)?;
        }
    }
    Ok(())
}
