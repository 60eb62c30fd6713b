//! Command dispatch and handlers.

pub mod audit;
pub mod check;

use std::path::{Path, PathBuf};

use crate::cli::{Command, InputArgs};
use crate::config::{AuditConfig, ConfigOverrides, CONFIG_ENV};
use crate::context::ServiceContext;

/// How a command that ran to completion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to report.
    Success,
    /// The command ran and found issues the caller asked to fail on.
    IssuesFound,
}

/// Dispatch a parsed command to its handler against the real disk.
///
/// A config file named by `GOLDTHREAD_CONFIG` is used when `--config` is
/// absent.
///
/// # Errors
///
/// Returns an error string if the command could not run.
pub fn dispatch(command: &Command) -> Result<Outcome, String> {
    let config_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    dispatch_with_context(command, &ServiceContext::live(), config_env.as_deref())
}

/// Dispatch a command with the given service context.
///
/// `config_env` stands in for the `GOLDTHREAD_CONFIG` variable.
///
/// # Errors
///
/// Returns an error string if the command could not run.
pub fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    config_env: Option<&Path>,
) -> Result<Outcome, String> {
    match command {
        Command::Audit { inputs, out, orphans_out, title, subtitle, strict } => {
            let overrides = ConfigOverrides {
                output: out.clone(),
                orphans_output: orphans_out.clone(),
                title: title.clone(),
                subtitle: subtitle.clone(),
                ..inputs.overrides()
            };
            let config = resolve_config(ctx, inputs, config_env, overrides)?;
            audit::run_with_context(ctx, &config, *strict)
        }
        Command::Check { inputs, format } => {
            let config = resolve_config(ctx, inputs, config_env, inputs.overrides())?;
            check::run_with_context(ctx, &config, *format)
        }
    }
}

fn resolve_config(
    ctx: &ServiceContext,
    inputs: &InputArgs,
    config_env: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<AuditConfig, String> {
    AuditConfig::load(ctx, &inputs.root, inputs.config.as_deref(), config_env)
        .and_then(|config| config.apply(overrides))
        .map_err(|e| e.to_string())
}
