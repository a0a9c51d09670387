//! Siteprep: guided provisioning for a managed site root.
//!
//! A four-step pipeline turns a prepared directory tree into a configured,
//! provisioned site:
//!
//! 1. **Environment** — named requirement checks against the root
//! 2. **Configuration** — validate a submission, persist it, render the
//!    configuration files from their templates
//! 3. **Provisioning** — create schema and seed data for the selected
//!    modules, then generate the locale lookup artifacts
//! 4. **Completion** — write the marker that makes the root inert
//!
//! Navigation is clamped, never trusted: each invocation re-derives the
//! furthest step durable state allows. Once the completion marker exists,
//! every invocation refuses to run.
//!
//! # Crate Structure
//!
//! - [`core`]: the wizard state machine and its shared primitives
//! - [`modules`]: installable modules and the static installer registry

pub mod core;
pub mod modules;

mod cli;

use crate::cli::{Cli, Command};
use crate::core::context::SetupContext;
use crate::core::error::{SetupError, ValidationReport};
use crate::core::requirements::{self, RequirementReport};
use crate::core::wizard::{self, StepOutcome, StepRun};
use clap::Parser;
use colored::Colorize;

pub fn run() -> Result<(), SetupError> {
    let cli = Cli::parse();
    let ctx = SetupContext::new(&cli.root);

    match cli.command {
        Command::Version => {
            // Simple output for scripts/parsing
            println!("v{}", env!("CARGO_PKG_VERSION"));
        }
        Command::Check => {
            let report = requirements::check(&ctx);
            render_requirements(&report);
        }
        Command::Status => {
            let status = wizard::status(&ctx)?;
            render_status(&status);
        }
        Command::Run(run_cli) => match wizard::run_step(&ctx, run_cli.step, run_cli.answers.as_deref()) {
            Ok(run) => render_step(&run),
            Err(SetupError::Validation(report)) => {
                render_validation(&report);
                return Err(SetupError::Validation(report));
            }
            Err(err) => return Err(err),
        },
    }
    Ok(())
}

fn render_requirements(report: &RequirementReport) {
    println!("{}", "Environment checks".bold());
    for check in &report.checks {
        let mark = if check.passed {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        println!("  {} {} — {}", mark, check.name, check.detail);
    }
    if report.passed() {
        println!("{}", "All checks passed.".bright_green());
    } else {
        println!(
            "{}",
            format!("{} check(s) failed.", report.failed_count()).bright_red()
        );
    }
}

fn render_validation(report: &ValidationReport) {
    println!("{}", "The submission was rejected:".bright_red().bold());
    for error in &report.errors {
        match &error.field {
            Some(field) => println!("  {} {}: {}", "✗".bright_red(), field.bold(), error.message),
            None => println!("  {} {}", "✗".bright_red(), error.message),
        }
    }
}

fn render_status(status: &wizard::StatusReport) {
    let flag = |set: bool| if set { "yes".bright_green() } else { "no".bright_yellow() };
    println!("installed:   {}", flag(status.installed));
    println!("configured:  {}", flag(status.configured));
    println!("provisioned: {}", flag(status.provisioned));
    println!("modules:");
    for module in &status.modules {
        let tag = if module.required {
            "required".bright_cyan()
        } else {
            "optional".normal()
        };
        println!("  {} ({}) [{}]", module.label, module.id, tag);
    }
    if status.installed {
        println!("Installation is complete; nothing left to run.");
    } else if status.provisioned {
        println!("Next: run step 4.");
    } else if status.configured {
        println!("Next: run step 3 with a provisioning answers file.");
    } else {
        println!("Next: run step 1.");
    }
}

fn render_step(run: &StepRun) {
    if run.executed != run.requested {
        println!(
            "{}",
            format!(
                "Step {} is not available yet; running step {} instead.",
                run.requested.number(),
                run.executed.number()
            )
            .bright_yellow()
        );
    }
    match &run.outcome {
        StepOutcome::Environment { report, next } => {
            render_requirements(report);
            match next {
                Some(step) => println!("Next: run step {}.", step.number()),
                None => println!("Fix the failing checks and run step 1 again."),
            }
        }
        StepOutcome::Configured { written } => {
            println!("{}", "Configuration captured.".bright_green());
            for path in written {
                println!("  wrote {}", path.display());
            }
            println!("Next: run step 3 with a provisioning answers file.");
        }
        StepOutcome::Provisioned { outcome, caches } => {
            println!("{}", "Provisioning complete.".bright_green());
            for module in &outcome.applied {
                println!("  {} {}", "✓".bright_green(), module);
            }
            for module in &outcome.skipped {
                println!("  {} {} (nothing to install)", "-".bright_yellow(), module);
            }
            println!("  {} locale artifact(s) written", caches.len());
            println!("Next: run step 4.");
        }
        StepOutcome::Finished {
            login,
            password,
            marker,
        } => {
            println!("{}", "Installation finished.".bright_green().bold());
            println!("  login:    {}", login);
            println!("  password: {}", password);
            println!("  marker:   {}", marker.display());
        }
    }
}
