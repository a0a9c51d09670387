//! The guided provisioning pipeline: four ordered steps with clamped
//! navigation.
//!
//! Every invocation re-derives the step it is allowed to execute from
//! durable state: the completion marker wins over everything, then the
//! environment gate, then the captured-configuration gate, then the
//! provisioned gate. Requesting a later step never skips an unmet earlier
//! one; the request is clamped down and the earlier step runs instead.

use crate::core::config_files::{self, TokenTable};
use crate::core::context::{Application, SetupContext};
use crate::core::db;
use crate::core::error::{FieldError, SetupError, ValidationReport};
use crate::core::forms::{self, LanguageMode};
use crate::core::locale_cache;
use crate::core::requirements::{self, RequirementReport};
use crate::core::session::{SessionStore, keys};
use crate::core::time;
use crate::modules::{self, ModuleDescriptor, ProvisionOutcome};
use std::fs;
use std::path::{Path, PathBuf};

/// The four wizard steps, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum InstallStep {
    AwaitingEnvironment = 1,
    CapturingConfig = 2,
    Provisioning = 3,
    Completed = 4,
}

impl InstallStep {
    /// Map a requested step number onto a step. Anything outside 1..=4 is
    /// treated as a request for the first step, not an error.
    pub fn from_request(step: u8) -> Self {
        match step {
            2 => InstallStep::CapturingConfig,
            3 => InstallStep::Provisioning,
            4 => InstallStep::Completed,
            _ => InstallStep::AwaitingEnvironment,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

/// Result of one invocation: the step asked for, the step that actually
/// ran after clamping, and what it produced.
#[derive(Debug)]
pub struct StepRun {
    pub requested: InstallStep,
    pub executed: InstallStep,
    pub outcome: StepOutcome,
}

#[derive(Debug)]
pub enum StepOutcome {
    /// Step 1: the environment report, plus the step to run next when the
    /// environment passes.
    Environment {
        report: RequirementReport,
        next: Option<InstallStep>,
    },
    /// Step 2: configuration files written to the library directory.
    Configured { written: Vec<PathBuf> },
    /// Step 3: modules applied and skipped, locale artifacts written.
    Provisioned {
        outcome: ProvisionOutcome,
        caches: Vec<PathBuf>,
    },
    /// Step 4: the login summary and the completion marker path.
    Finished {
        login: String,
        password: String,
        marker: PathBuf,
    },
}

/// Refuse to run anything once the completion marker exists. Checked before
/// any other state is consulted, so a finished installation is inert no
/// matter what step is requested.
pub fn guard_not_installed(ctx: &SetupContext) -> Result<(), SetupError> {
    let marker = ctx.marker_path();
    if marker.is_file() {
        return Err(SetupError::AlreadyInstalled(marker.display().to_string()));
    }
    Ok(())
}

/// Clamp a requested step down to the furthest step durable state allows.
pub fn effective_step(
    requested: InstallStep,
    environment_ok: bool,
    session: &SessionStore,
) -> InstallStep {
    if requested > InstallStep::AwaitingEnvironment && !environment_ok {
        return InstallStep::AwaitingEnvironment;
    }
    if requested >= InstallStep::Provisioning && !session.exists(keys::STEP2_REQUIRED) {
        return InstallStep::CapturingConfig;
    }
    if requested == InstallStep::Completed && !session.get_bool(keys::PROVISIONED) {
        return InstallStep::Provisioning;
    }
    requested
}

/// Execute one wizard invocation for the requested step number.
pub fn run_step(
    ctx: &SetupContext,
    requested_step: u8,
    answers: Option<&Path>,
) -> Result<StepRun, SetupError> {
    guard_not_installed(ctx)?;

    let requested = InstallStep::from_request(requested_step);
    let mut session = SessionStore::load(ctx)?;
    let report = requirements::check(ctx);
    let executed = effective_step(requested, report.passed(), &session);

    let outcome = match executed {
        InstallStep::AwaitingEnvironment => {
            let next = report.passed().then_some(InstallStep::CapturingConfig);
            StepOutcome::Environment { report, next }
        }
        InstallStep::CapturingConfig => capture_config(ctx, &mut session, answers)?,
        InstallStep::Provisioning => provision(ctx, &mut session, answers)?,
        InstallStep::Completed => finish(ctx, &session)?,
    };

    Ok(StepRun {
        requested,
        executed,
        outcome,
    })
}

fn require_answers(answers: Option<&Path>) -> Result<&Path, SetupError> {
    answers.ok_or_else(|| {
        let mut report = ValidationReport::default();
        report.push(FieldError::form("this step requires an answers file"));
        SetupError::Validation(report)
    })
}

/// Step 2: validate the submission, persist it, render the configuration
/// files. Nothing is persisted unless the whole submission validates.
fn capture_config(
    ctx: &SetupContext,
    session: &mut SessionStore,
    answers: Option<&Path>,
) -> Result<StepOutcome, SetupError> {
    let answers = forms::load_step2(require_answers(answers)?)?;
    let report = forms::validate_step2(ctx, &answers);
    if !report.is_empty() {
        return Err(SetupError::Validation(report));
    }

    session.set_str(keys::LIBRARY_PATH, &answers.library_path)?;
    session.set_str(keys::DEBUG_EMAIL, &answers.debug_email)?;
    session.set_str(keys::DATABASE_HOSTNAME, &answers.database_hostname)?;
    session.set_str(keys::DATABASE_NAME, &answers.database_name)?;
    session.set_str(keys::DATABASE_USERNAME, &answers.database_username)?;
    session.set_str(keys::DATABASE_PASSWORD, &answers.database_password)?;
    session.set_str(keys::SITE_DOMAIN, &answers.site_domain)?;
    session.set_str(keys::SITE_TITLE, &answers.site_title)?;
    session.set_list(keys::LANGUAGES, &answers.languages)?;
    session.set_str(keys::DEFAULT_LANGUAGE, &answers.default_language)?;

    let multilanguage = answers.language_mode == LanguageMode::Multiple;
    let tokens: TokenTable = vec![
        // The quoted form first so the rendered value is unquoted.
        (
            "'<site-multilanguage>'",
            if multilanguage { "true" } else { "false" }.to_string(),
        ),
        ("<database-hostname>", answers.database_hostname.clone()),
        ("<database-name>", answers.database_name.clone()),
        ("<database-username>", answers.database_username.clone()),
        ("<database-password>", answers.database_password.clone()),
        ("<debug-email>", answers.debug_email.clone()),
        ("<site-domain>", answers.site_domain.clone()),
        ("<site-default-title>", answers.site_title.clone()),
        ("<site-default-language>", answers.default_language.clone()),
        ("<path-www>", ctx.web_root.display().to_string()),
        ("<path-library>", answers.library_path.clone()),
    ];
    let written = config_files::materialize(ctx, &tokens)?;

    Ok(StepOutcome::Configured { written })
}

/// Step 3: validate the submission, apply the base system and every module
/// in the final selection, then rebuild every locale artifact.
fn provision(
    ctx: &SetupContext,
    session: &mut SessionStore,
    answers: Option<&Path>,
) -> Result<StepOutcome, SetupError> {
    let answers = forms::load_step3(require_answers(answers)?)?;
    let report = forms::validate_step3(&answers);
    if !report.is_empty() {
        return Err(SetupError::Validation(report));
    }

    session.set_str(keys::ADMIN_PASSWORD, &answers.admin_password)?;

    let languages = session.require_list(keys::LANGUAGES)?;
    let params = modules::InstallParams {
        default_language: session.require_str(keys::DEFAULT_LANGUAGE)?,
        debug_email: session.require_str(keys::DEBUG_EMAIL)?,
        api_email: answers.api_email.clone(),
        site_domain: session.require_str(keys::SITE_DOMAIN)?,
        site_title: session.require_str(keys::SITE_TITLE)?,
        smtp_server: answers.smtp_server.clone(),
        smtp_port: answers.smtp_port.clone(),
        smtp_username: answers.smtp_username.clone(),
        smtp_password: answers.smtp_password.clone(),
        admin_password: Some(answers.admin_password.clone()),
    };

    let discovered = modules::discover(ctx)?;
    let selection = modules::final_selection(&discovered, &answers.modules);

    let database = session.require_str(keys::DATABASE_NAME)?;
    let conn = db::connect(&ctx.database_path(&database))?;

    modules::core_install::install(&conn, &languages, &params)?;
    let outcome = modules::install_selected(&conn, &selection, &languages, &params)?;

    let mut caches = Vec::with_capacity(languages.len() * Application::ALL.len());
    for language in &languages {
        for application in Application::ALL {
            caches.push(locale_cache::build(&conn, ctx, language, application)?);
        }
    }

    session.set_bool(keys::PROVISIONED, true)?;

    Ok(StepOutcome::Provisioned { outcome, caches })
}

/// Step 4: write the completion marker and report the login summary.
fn finish(ctx: &SetupContext, session: &SessionStore) -> Result<StepOutcome, SetupError> {
    let login = session.require_str(keys::DEBUG_EMAIL)?;
    let password = session.require_str(keys::ADMIN_PASSWORD)?;

    let marker = ctx.marker_path();
    if let Some(parent) = marker.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&marker, format!("installation complete {}\n", time::now_epoch_z()))?;

    Ok(StepOutcome::Finished {
        login,
        password,
        marker,
    })
}

/// Snapshot of durable progress, for the status command.
#[derive(Debug)]
pub struct StatusReport {
    pub installed: bool,
    pub configured: bool,
    pub provisioned: bool,
    pub modules: Vec<ModuleDescriptor>,
}

pub fn status(ctx: &SetupContext) -> Result<StatusReport, SetupError> {
    let session = SessionStore::load(ctx)?;
    let mut descriptors = vec![modules::core_descriptor()];
    if ctx.modules_dir().is_dir() {
        descriptors.extend(modules::discover(ctx)?);
    }
    Ok(StatusReport {
        installed: ctx.marker_path().is_file(),
        configured: session.exists(keys::STEP2_REQUIRED),
        provisioned: session.get_bool(keys::PROVISIONED),
        modules: descriptors,
    })
}
