//! Generated locale lookup tables, one artifact per (language, application).
//!
//! Rows come back ordered by (type, name, module) and are grouped by type,
//! then by module. The two surfaces get different shapes on purpose: admin
//! screens are module-scoped so the admin artifact namespaces entries per
//! module, while public lookups are by name only so that artifact is flat.
//! Given identical rows the emitted bytes are identical across runs —
//! ordering is stable and values are escaped deterministically.

use crate::core::context::{Application, SetupContext};
use crate::core::db;
use crate::core::error::SetupError;
use rusqlite::{Connection, params};
use std::fs;
use std::path::PathBuf;

struct LocaleRow {
    kind: String,
    module: String,
    name: String,
    value: String,
}

/// Build (or rebuild, overwriting in place) the locale artifact for one
/// (language, application) pair. Returns the path written.
pub fn build(
    conn: &Connection,
    ctx: &SetupContext,
    language: &str,
    application: Application,
) -> Result<PathBuf, SetupError> {
    let types = db::enum_values(conn, "locale", "type")?;

    let mut stmt = conn.prepare(
        "SELECT type, module, name, value
         FROM locale
         WHERE language = ?1 AND application = ?2
         ORDER BY type ASC, name ASC, module ASC",
    )?;
    let rows = stmt
        .query_map(params![language, application.as_str()], |row| {
            Ok(LocaleRow {
                kind: row.get(0)?,
                module: row.get(1)?,
                name: row.get(2)?,
                value: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let content = render(&types, &rows, application, language);

    let path = ctx.locale_cache_path(application, language);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content)?;
    Ok(path)
}

fn render(types: &[String], rows: &[LocaleRow], application: Application, language: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Locale lookup table for the {} surface, language '{}'.\n",
        application.as_str(),
        language
    ));
    out.push_str("# Generated by siteprep. Do not edit.\n");

    for kind in types {
        let of_kind: Vec<&LocaleRow> = rows.iter().filter(|r| &r.kind == kind).collect();
        if of_kind.is_empty() {
            continue;
        }
        match application {
            Application::Admin => render_admin_type(&mut out, kind, &of_kind),
            Application::Public => render_public_type(&mut out, kind, &of_kind),
        }
    }
    out
}

/// Admin shape: one `[type.module]` table per module, modules in first-seen
/// order under the (name, module) row ordering.
fn render_admin_type(out: &mut String, kind: &str, rows: &[&LocaleRow]) {
    let mut modules: Vec<(&str, Vec<(&str, &str)>)> = Vec::new();
    for row in rows {
        match modules.iter_mut().find(|(m, _)| *m == row.module.as_str()) {
            Some((_, entries)) => entries.push((&row.name, &row.value)),
            None => modules.push((&row.module, vec![(&row.name, &row.value)])),
        }
    }
    for (module, entries) in modules {
        out.push('\n');
        out.push_str(&format!("[{kind}.{module}]\n"));
        for (name, value) in entries {
            out.push_str(&format!("\"{}\" = \"{}\"\n", escape(name), escape(value)));
        }
    }
}

/// Public shape: flat per type. A name seeded by several modules keeps its
/// first position and takes the last value, matching map-assignment
/// semantics in the consuming runtime.
fn render_public_type(out: &mut String, kind: &str, rows: &[&LocaleRow]) {
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for row in rows {
        match entries.iter_mut().find(|(n, _)| *n == row.name.as_str()) {
            Some(entry) => entry.1 = &row.value,
            None => entries.push((&row.name, &row.value)),
        }
    }
    out.push('\n');
    out.push_str(&format!("[{kind}]\n"));
    for (name, value) in entries {
        out.push_str(&format!("\"{}\" = \"{}\"\n", escape(name), escape(value)));
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEST_SCHEMA: &str = "CREATE TABLE locale (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        language TEXT NOT NULL,
        application TEXT NOT NULL,
        module TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('act', 'err', 'lbl', 'msg')),
        name TEXT NOT NULL,
        value TEXT NOT NULL
    );";

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch(TEST_SCHEMA).expect("schema");
        let rows: &[(&str, &str, &str, &str, &str, &str)] = &[
            ("en", "admin", "core", "lbl", "Save", "Save"),
            ("en", "admin", "users", "lbl", "Email", "E-mail address"),
            ("en", "admin", "users", "err", "EmailInvalid", "Invalid e-mail"),
            ("en", "public", "core", "lbl", "Send", "Send"),
            ("en", "public", "core", "msg", "Welcome", "Welcome to \"the\" site"),
            ("nl", "public", "core", "lbl", "Send", "Versturen"),
        ];
        for (lang, app, module, kind, name, value) in rows {
            conn.execute(
                "INSERT INTO locale (language, application, module, type, name, value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![lang, app, module, kind, name, value],
            )
            .expect("insert");
        }
        conn
    }

    fn ctx() -> (TempDir, SetupContext) {
        let tmp = TempDir::new().expect("tempdir");
        let ctx = SetupContext::new(tmp.path());
        (tmp, ctx)
    }

    #[test]
    fn admin_artifact_namespaces_entries_per_module() {
        let conn = seeded_conn();
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "en", Application::Admin).expect("build");
        let content = fs::read_to_string(path).expect("read");
        assert!(content.contains("[lbl.core]\n\"Save\" = \"Save\"\n"), "{content}");
        assert!(
            content.contains("[lbl.users]\n\"Email\" = \"E-mail address\"\n"),
            "{content}"
        );
        assert!(content.contains("[err.users]"), "{content}");
    }

    #[test]
    fn public_artifact_is_flat_by_name() {
        let conn = seeded_conn();
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "en", Application::Public).expect("build");
        let content = fs::read_to_string(path).expect("read");
        assert!(content.contains("[lbl]\n\"Send\" = \"Send\"\n"), "{content}");
        assert!(!content.contains("[lbl.core]"), "{content}");
    }

    #[test]
    fn values_escape_quotes_and_backslashes() {
        let conn = seeded_conn();
        conn.execute(
            "INSERT INTO locale (language, application, module, type, name, value)
             VALUES ('en', 'public', 'core', 'msg', 'Path', 'C:\\temp')",
            [],
        )
        .expect("insert");
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "en", Application::Public).expect("build");
        let content = fs::read_to_string(path).expect("read");
        assert!(
            content.contains("\"Welcome\" = \"Welcome to \\\"the\\\" site\""),
            "{content}"
        );
        assert!(content.contains("\"Path\" = \"C:\\\\temp\""), "{content}");
    }

    #[test]
    fn repeated_builds_are_byte_identical() {
        let conn = seeded_conn();
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "en", Application::Admin).expect("first build");
        let first = fs::read(&path).expect("read first");
        let path = build(&conn, &ctx, "en", Application::Admin).expect("second build");
        let second = fs::read(&path).expect("read second");
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_public_names_keep_first_position_and_last_value() {
        let conn = seeded_conn();
        // Same name from two modules; (name, module) ordering makes
        // 'users' the later row, so its value wins.
        conn.execute_batch(
            "INSERT INTO locale (language, application, module, type, name, value)
             VALUES ('en', 'public', 'users', 'lbl', 'Send', 'Submit');",
        )
        .expect("insert");
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "en", Application::Public).expect("build");
        let content = fs::read_to_string(path).expect("read");
        assert!(content.contains("\"Send\" = \"Submit\""), "{content}");
        assert_eq!(content.matches("\"Send\" = ").count(), 1, "{content}");
    }

    #[test]
    fn empty_language_yields_header_only_artifact() {
        let conn = seeded_conn();
        let (_tmp, ctx) = ctx();
        let path = build(&conn, &ctx, "fr", Application::Public).expect("build");
        let content = fs::read_to_string(path).expect("read");
        assert!(content.starts_with("# Locale lookup table"), "{content}");
        assert!(!content.contains('['), "{content}");
    }
}
