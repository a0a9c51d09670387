//! Explicit setup context passed to every component.
//!
//! All path knowledge lives here: the managed web root, the library
//! directory with configuration templates, the install workspace, and the
//! per-surface cache directories. Constructed once at process start and
//! threaded through the pipeline; there is no ambient global state.

use std::path::{Path, PathBuf};

/// Consuming application surface for generated locale artifacts.
///
/// The admin surface is module-scoped (its screens belong to modules), the
/// public surface is module-agnostic. The asymmetry in the generated
/// artifacts is intentional and preserved by the cache builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    Public,
    Admin,
}

impl Application {
    pub const ALL: [Application; 2] = [Application::Public, Application::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Application::Public => "public",
            Application::Admin => "admin",
        }
    }
}

/// Paths and flags for one provisioning run.
#[derive(Debug, Clone)]
pub struct SetupContext {
    /// Root of the managed site tree.
    pub web_root: PathBuf,
}

impl SetupContext {
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        Self {
            web_root: web_root.into(),
        }
    }

    /// Library directory: configuration templates, generated configuration
    /// files and database files live here.
    pub fn library_dir(&self) -> PathBuf {
        self.web_root.join("library")
    }

    /// Installer workspace: session store and completion marker.
    pub fn install_dir(&self) -> PathBuf {
        self.web_root.join("install")
    }

    /// Discovery root for installable modules.
    pub fn modules_dir(&self) -> PathBuf {
        self.web_root.join("admin").join("modules")
    }

    pub fn public_files_dir(&self) -> PathBuf {
        self.web_root.join("public").join("files")
    }

    pub fn cache_dir(&self, app: Application) -> PathBuf {
        self.web_root.join(app.as_str()).join("cache")
    }

    /// Destination for one generated locale artifact, keyed by
    /// (application, language). Rebuilding overwrites in place.
    pub fn locale_cache_path(&self, app: Application, language: &str) -> PathBuf {
        self.cache_dir(app)
            .join("locale")
            .join(format!("{language}.toml"))
    }

    pub fn session_path(&self) -> PathBuf {
        self.install_dir().join("session.json")
    }

    /// Completion marker; its mere existence gates all future invocations.
    pub fn marker_path(&self) -> PathBuf {
        self.install_dir().join("installed.txt")
    }

    /// Database file for the named database.
    pub fn database_path(&self, name: &str) -> PathBuf {
        self.library_dir().join(format!("{name}.sqlite"))
    }

    pub fn template_path(&self, file_name: &str) -> PathBuf {
        self.library_dir().join(file_name)
    }

    /// Directories that must exist and be writable before anything runs.
    pub fn required_writable_dirs(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("admin cache directory", self.cache_dir(Application::Admin)),
            ("public cache directory", self.cache_dir(Application::Public)),
            ("public files directory", self.public_files_dir()),
            ("install directory", self.install_dir()),
            ("library directory", self.library_dir()),
        ]
    }
}

impl AsRef<Path> for SetupContext {
    fn as_ref(&self) -> &Path {
        &self.web_root
    }
}
