//! Environment requirement checks (wizard step 1).
//!
//! A fixed, enumerable list of named predicates: runtime capability probes,
//! writable-directory checks and template-file presence checks. Every
//! predicate is independent and side-effect-free; the aggregate gates
//! advancement past step 1 but a failure is never fatal to the process.

use crate::core::config_files;
use crate::core::context::SetupContext;
use rusqlite::Connection;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Minimum SQLite library version (3.35.0): required for the DDL features
/// the module installers rely on.
const MIN_SQLITE_VERSION: i32 = 3_035_000;

#[derive(Debug, Clone)]
pub struct RequirementCheck {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Per-item results plus the aggregate gate for step 1.
#[derive(Debug, Clone, Default)]
pub struct RequirementReport {
    pub checks: Vec<RequirementCheck>,
}

impl RequirementReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    fn record(&mut self, name: &str, passed: bool, detail: impl Into<String>) {
        self.checks.push(RequirementCheck {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        });
    }
}

/// Run every requirement predicate against the managed root.
pub fn check(ctx: &SetupContext) -> RequirementReport {
    let mut report = RequirementReport::default();

    // Runtime capabilities of the embedded database library.
    let version = rusqlite::version_number();
    report.record(
        "SQLite version",
        version >= MIN_SQLITE_VERSION,
        format!("{} (minimum 3.35.0)", rusqlite::version()),
    );
    report.record(
        "JSON support",
        probe_capability("SELECT json('[]')"),
        "json() scalar function",
    );
    report.record(
        "Foreign key support",
        probe_capability("PRAGMA foreign_keys=ON"),
        "PRAGMA foreign_keys",
    );

    // Writable directories.
    for (name, dir) in ctx.required_writable_dirs() {
        let ok = dir_writable(&dir);
        report.record(
            name,
            ok,
            format!(
                "{} {}",
                dir.display(),
                if ok { "is writable" } else { "is not writable" }
            ),
        );
    }

    // Configuration templates must be present and readable.
    for (source, _dest) in config_files::TEMPLATE_FILES {
        let path = ctx.template_path(source);
        let ok = file_readable(&path);
        report.record(
            source,
            ok,
            format!(
                "{} {}",
                path.display(),
                if ok { "is readable" } else { "is missing or unreadable" }
            ),
        );
    }

    report
}

/// Probe one capability against a throwaway in-memory connection.
fn probe_capability(sql: &str) -> bool {
    let Ok(conn) = Connection::open_in_memory() else {
        return false;
    };
    conn.execute_batch(sql).is_ok()
}

/// Writability is proven by creating and removing a probe file; metadata
/// flags alone lie on some filesystems.
fn dir_writable(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let probe = dir.join(".siteprep-write-probe");
    let created = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .is_ok();
    if created {
        let _ = fs::remove_file(&probe);
    }
    created
}

fn file_readable(path: &Path) -> bool {
    path.is_file() && fs::read(path).is_ok()
}
