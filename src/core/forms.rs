//! Step submissions: answers-file parsing and validation.
//!
//! Steps 2 and 3 take their input from a TOML answers file. Parsing is
//! lenient (missing fields default to empty) so that validation — not the
//! deserializer — owns the per-field "this field is required" reporting.

use crate::core::context::SetupContext;
use crate::core::db;
use crate::core::error::{FieldError, SetupError, ValidationReport};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Languages the seeded locale data covers.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "fr", "nl"];

/// Whether the site runs one language or several. The default-language
/// invariant is identical for both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    Single,
    #[default]
    Multiple,
}

/// Step 2 submission: configuration capture.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Step2Answers {
    pub library_path: String,
    pub debug_email: String,
    pub database_hostname: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,
    pub site_domain: String,
    pub site_title: String,
    pub language_mode: LanguageMode,
    pub languages: Vec<String>,
    pub default_language: String,
}

/// Step 3 submission: module selection and provisioning parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Step3Answers {
    pub modules: Vec<String>,
    pub api_email: String,
    pub admin_password: String,
    pub smtp_server: String,
    pub smtp_port: String,
    pub smtp_username: String,
    pub smtp_password: String,
}

pub fn load_step2(path: &Path) -> Result<Step2Answers, SetupError> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

pub fn load_step3(path: &Path) -> Result<Step3Answers, SetupError> {
    let raw = fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn is_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

fn require_filled(report: &mut ValidationReport, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        report.push(FieldError::on(field, "this field is required"));
        false
    } else {
        true
    }
}

/// Validate a step 2 submission, including the live database round trip.
/// An empty report means the submission may be persisted.
pub fn validate_step2(ctx: &SetupContext, answers: &Step2Answers) -> ValidationReport {
    let mut report = ValidationReport::default();

    let required: &[(&str, &str)] = &[
        ("library_path", &answers.library_path),
        ("debug_email", &answers.debug_email),
        ("database_hostname", &answers.database_hostname),
        ("database_name", &answers.database_name),
        ("database_username", &answers.database_username),
        ("database_password", &answers.database_password),
        ("site_domain", &answers.site_domain),
        ("site_title", &answers.site_title),
        ("default_language", &answers.default_language),
    ];
    for (field, value) in required {
        require_filled(&mut report, field, value);
    }

    if !answers.library_path.trim().is_empty()
        && !Path::new(&answers.library_path).is_dir()
    {
        report.push(FieldError::on(
            "library_path",
            "no library directory found at this path",
        ));
    }

    if !answers.debug_email.trim().is_empty() && !is_email(&answers.debug_email) {
        report.push(FieldError::on("debug_email", "this is an invalid email address"));
    }

    if answers.languages.is_empty() {
        report.push(FieldError::on("languages", "choose at least one language"));
    }
    if answers.language_mode == LanguageMode::Single && answers.languages.len() > 1 {
        report.push(FieldError::on(
            "languages",
            "single language mode allows exactly one language",
        ));
    }
    for language in &answers.languages {
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            report.push(FieldError::on(
                "languages",
                format!("unsupported language '{language}'"),
            ));
        }
    }

    // Identical invariant for single and multiple mode: the default must be
    // a member of the chosen set.
    if !answers.default_language.trim().is_empty()
        && !answers.languages.contains(&answers.default_language)
    {
        report.push(FieldError::on(
            "default_language",
            "your default language needs to be in the list of languages you chose",
        ));
    }

    // Live credential check: prove DDL privileges with a create/drop round
    // trip before accepting the captured database settings.
    if !answers.database_name.trim().is_empty() {
        let db_path = ctx.database_path(&answers.database_name);
        if let Err(err) = db::probe_ddl(&db_path) {
            report.push(FieldError::form(format!(
                "problem with database credentials: {err}"
            )));
        }
    }

    report
}

/// Validate a step 3 submission.
pub fn validate_step3(answers: &Step3Answers) -> ValidationReport {
    let mut report = ValidationReport::default();

    let required: &[(&str, &str)] = &[
        ("api_email", &answers.api_email),
        ("admin_password", &answers.admin_password),
        ("smtp_server", &answers.smtp_server),
        ("smtp_port", &answers.smtp_port),
        ("smtp_username", &answers.smtp_username),
        ("smtp_password", &answers.smtp_password),
    ];
    for (field, value) in required {
        require_filled(&mut report, field, value);
    }

    if !answers.api_email.trim().is_empty() && !is_email(&answers.api_email) {
        report.push(FieldError::on("api_email", "this is an invalid email address"));
    }

    if !answers.smtp_port.trim().is_empty() && answers.smtp_port.parse::<u16>().is_err() {
        report.push(FieldError::on("smtp_port", "this is not a valid port number"));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx_with_library() -> (TempDir, SetupContext) {
        let tmp = TempDir::new().expect("tempdir");
        let ctx = SetupContext::new(tmp.path());
        std::fs::create_dir_all(ctx.library_dir()).expect("library dir");
        (tmp, ctx)
    }

    fn valid_step2(ctx: &SetupContext) -> Step2Answers {
        Step2Answers {
            library_path: ctx.library_dir().display().to_string(),
            debug_email: "dev@example.test".to_string(),
            database_hostname: "localhost".to_string(),
            database_name: "site_db".to_string(),
            database_username: "site".to_string(),
            database_password: "secret".to_string(),
            site_domain: "example.test".to_string(),
            site_title: "Example".to_string(),
            language_mode: LanguageMode::Multiple,
            languages: vec!["en".to_string(), "nl".to_string()],
            default_language: "nl".to_string(),
        }
    }

    #[test]
    fn a_complete_submission_passes() {
        let (_tmp, ctx) = ctx_with_library();
        let report = validate_step2(&ctx, &valid_step2(&ctx));
        assert!(report.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn default_language_must_be_in_the_chosen_set_multiple_mode() {
        let (_tmp, ctx) = ctx_with_library();
        let mut answers = valid_step2(&ctx);
        answers.languages = vec!["en".to_string(), "nl".to_string()];
        answers.default_language = "fr".to_string();
        let report = validate_step2(&ctx, &answers);
        assert!(report.has_field("default_language"), "{:?}", report.errors);
    }

    #[test]
    fn default_language_must_be_in_the_chosen_set_single_mode() {
        let (_tmp, ctx) = ctx_with_library();
        let mut answers = valid_step2(&ctx);
        answers.language_mode = LanguageMode::Single;
        answers.languages = vec!["en".to_string()];
        answers.default_language = "nl".to_string();
        let report = validate_step2(&ctx, &answers);
        assert!(report.has_field("default_language"), "{:?}", report.errors);
    }

    #[test]
    fn single_mode_with_matching_default_passes() {
        let (_tmp, ctx) = ctx_with_library();
        let mut answers = valid_step2(&ctx);
        answers.language_mode = LanguageMode::Single;
        answers.languages = vec!["nl".to_string()];
        answers.default_language = "nl".to_string();
        let report = validate_step2(&ctx, &answers);
        assert!(report.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn empty_fields_are_reported_individually() {
        let (_tmp, ctx) = ctx_with_library();
        let report = validate_step2(&ctx, &Step2Answers::default());
        assert!(report.has_field("database_name"));
        assert!(report.has_field("site_domain"));
        assert!(report.has_field("languages"));
    }

    #[test]
    fn malformed_email_is_a_field_error() {
        let (_tmp, ctx) = ctx_with_library();
        let mut answers = valid_step2(&ctx);
        answers.debug_email = "not-an-email".to_string();
        let report = validate_step2(&ctx, &answers);
        assert!(report.has_field("debug_email"), "{:?}", report.errors);
    }

    #[test]
    fn failed_ddl_round_trip_is_a_form_level_error() {
        let (_tmp, ctx) = ctx_with_library();
        let mut answers = valid_step2(&ctx);
        answers.database_name = "blocked".to_string();
        // Occupy the database path with a directory so the probe fails.
        std::fs::create_dir(ctx.database_path("blocked")).expect("blocker");
        let report = validate_step2(&ctx, &answers);
        assert!(report.has_form_error(), "{:?}", report.errors);
        assert!(!report.has_field("database_name"), "{:?}", report.errors);
    }

    #[test]
    fn step3_requires_relay_settings_and_numeric_port() {
        let mut answers = Step3Answers {
            modules: vec![],
            api_email: "admin@example.test".to_string(),
            admin_password: "secret".to_string(),
            smtp_server: "relay.example.test".to_string(),
            smtp_port: "smtp".to_string(),
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
        };
        let report = validate_step3(&answers);
        assert!(report.has_field("smtp_port"), "{:?}", report.errors);

        answers.smtp_port = "587".to_string();
        let report = validate_step3(&answers);
        assert!(report.is_empty(), "{:?}", report.errors);
    }

    #[test]
    fn answers_files_parse_with_missing_fields_defaulted() {
        let parsed: Step2Answers =
            toml::from_str("site_title = \"Example\"\nlanguages = [\"en\"]\n").expect("parse");
        assert_eq!(parsed.site_title, "Example");
        assert_eq!(parsed.language_mode, LanguageMode::Multiple);
        assert!(parsed.database_name.is_empty());
    }
}
