use crate::core::requirements::RequirementReport;
use rusqlite;
use std::fmt;
use std::io;
use thiserror::Error;

/// A single field-level (or form-level, when `field` is `None`) validation
/// message produced while checking a step submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn on(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn form(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// All validation messages for one step submission. A non-empty report means
/// the step re-renders with these messages; nothing has been persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when any error targets the given field.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.field.as_deref() == Some(field))
    }

    /// True when any form-level (fieldless) error is present.
    pub fn has_form_error(&self) -> bool {
        self.errors.iter().any(|e| e.field.is_none())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())
    }
}

#[derive(Error, Debug)]
pub enum SetupError {
    /// One or more environment predicates failed; the wizard clamps back to
    /// step 1 and surfaces the report. Never fatal to the process.
    #[error("environment requirements not met")]
    Prerequisite(RequirementReport),
    /// Malformed or missing step input, or a failed live database round
    /// trip. Recoverable; the same step is re-rendered with the report.
    #[error("{0}")]
    Validation(ValidationReport),
    /// A module installation routine failed. Fail-fast: the remaining
    /// sequence is aborted and `applied` records the partial-apply boundary.
    #[error("provisioning failed in module '{module}' after {} module(s) applied: {source}", applied.len())]
    Provisioning {
        module: String,
        applied: Vec<String>,
        #[source]
        source: Box<SetupError>,
    },
    /// The completion marker exists. Terminal; checked before any step logic
    /// and always reported the same way regardless of the requested step.
    #[error("already installed (completion marker at {0})")]
    AlreadyInstalled(String),
    /// A required support file or runtime capability was not found at
    /// initialization. Fatal; halts before any step is reached.
    #[error("missing dependency: {0}")]
    MissingDependency(String),
    /// A value expected in the step state store is absent. Points the
    /// operator back to the step that produces it.
    #[error("missing persisted value '{0}'; rerun the step that captures it")]
    MissingState(String),
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("answers file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("session store error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SetupError {
    /// Single-field validation failure shorthand.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut report = ValidationReport::default();
        report.push(FieldError::on(field, message));
        SetupError::Validation(report)
    }
}
