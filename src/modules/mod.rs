//! Installable modules: discovery, the fixed required set and the static
//! installer registry.
//!
//! Adding an installable module: append one entry to `INSTALLERS`. A module
//! without an entry is valid — selecting it simply installs nothing. The
//! core unit is not a module; it is always installed first and is never
//! part of the discovered list.

pub mod content_blocks;
pub mod core_install;
pub mod pages;
pub mod tags;
pub mod users;

use crate::core::context::SetupContext;
use crate::core::error::SetupError;
use regex::Regex;
use rusqlite::Connection;
use std::fs;
use std::sync::OnceLock;

/// Identifier of the base-system pseudo-descriptor.
pub const CORE_MODULE: &str = "core";

/// Modules that are always installed, in installation order, regardless of
/// what the submission selects or omits.
pub const REQUIRED_MODULES: &[&str] = &[
    "locale",
    "users",
    "authentication",
    "dashboard",
    "error",
    "settings",
    "pages",
    "contact",
    "content_blocks",
    "tags",
];

/// One selectable installation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub id: String,
    pub label: String,
    pub required: bool,
}

/// The always-first pseudo-descriptor for the base system.
pub fn core_descriptor() -> ModuleDescriptor {
    ModuleDescriptor {
        id: CORE_MODULE.to_string(),
        label: "Core".to_string(),
        required: true,
    }
}

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").expect("module id pattern is valid"))
}

/// Human-readable label from a module identifier: `content_blocks` →
/// `ContentBlocks`.
pub fn display_label(id: &str) -> String {
    id.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// List installable modules: immediate subdirectories of the modules root
/// whose names match the identifier pattern, sorted by identifier.
pub fn discover(ctx: &SetupContext) -> Result<Vec<ModuleDescriptor>, SetupError> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(ctx.modules_dir())? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if id_pattern().is_match(name) {
            ids.push(name.to_string());
        }
    }
    ids.sort();

    Ok(ids
        .into_iter()
        .map(|id| ModuleDescriptor {
            label: display_label(&id),
            required: REQUIRED_MODULES.contains(&id.as_str()),
            id,
        })
        .collect())
}

/// Compute the final installation set: the required modules (fixed order)
/// followed by any additionally selected discovered modules, in discovery
/// order. The required set survives any crafted submission; unknown
/// identifiers are dropped.
pub fn final_selection(discovered: &[ModuleDescriptor], requested: &[String]) -> Vec<String> {
    let mut selection: Vec<String> = REQUIRED_MODULES.iter().map(|m| m.to_string()).collect();
    for descriptor in discovered {
        if descriptor.id == CORE_MODULE || selection.contains(&descriptor.id) {
            continue;
        }
        if requested.iter().any(|r| r == &descriptor.id) {
            selection.push(descriptor.id.clone());
        }
    }
    selection
}

/// Free-form parameter bag handed to every installation routine.
#[derive(Debug, Clone, Default)]
pub struct InstallParams {
    pub default_language: String,
    pub debug_email: String,
    pub api_email: String,
    pub site_domain: String,
    pub site_title: String,
    pub smtp_server: String,
    pub smtp_port: String,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Initial administrator password; consumed by the users unit only.
    pub admin_password: Option<String>,
}

/// Installation routine contract: an open connection, the full chosen
/// language set and the parameter bag. The routine owns its schema and
/// seed data; failures propagate (fail-fast).
pub type InstallerFn = fn(&Connection, &[String], &InstallParams) -> Result<(), SetupError>;

/// Static registry mapping module identifiers to installation routines.
/// Absence of an entry is exactly the "nothing to do" case.
const INSTALLERS: &[(&str, InstallerFn)] = &[
    ("users", users::install),
    ("pages", pages::install),
    ("tags", tags::install),
    ("content_blocks", content_blocks::install),
];

pub fn installer_for(id: &str) -> Option<InstallerFn> {
    INSTALLERS
        .iter()
        .find(|(registered, _)| *registered == id)
        .map(|(_, install)| *install)
}

/// What one provisioning sequence applied and skipped.
#[derive(Debug, Clone, Default)]
pub struct ProvisionOutcome {
    /// Modules whose installation routine ran to completion, in order.
    pub applied: Vec<String>,
    /// Selected modules that ship no installation routine.
    pub skipped: Vec<String>,
}

/// Run the installation routine of every selected module, in order.
/// Fail-fast: the first failure aborts the sequence; the error carries the
/// modules already applied so operators can diagnose the partial apply.
pub fn install_selected(
    conn: &Connection,
    selection: &[String],
    languages: &[String],
    params: &InstallParams,
) -> Result<ProvisionOutcome, SetupError> {
    let mut outcome = ProvisionOutcome::default();
    for id in selection {
        if id == CORE_MODULE {
            continue;
        }
        match installer_for(id) {
            Some(install) => {
                install(conn, languages, params).map_err(|err| SetupError::Provisioning {
                    module: id.clone(),
                    applied: outcome.applied.clone(),
                    source: Box::new(err),
                })?;
                outcome.applied.push(id.clone());
            }
            None => outcome.skipped.push(id.clone()),
        }
    }
    Ok(outcome)
}
