//! Application service: interactive Nightwatch enrollment.
//!
//! Checks the host, picks a port, writes the Nightwatch block into the shared
//! `.env` and then provisions the agent on that same port. Nothing on the
//! host changes unless the precondition checks pass.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{LocalFs, ProgressReporter, Prompter, RemoteExecutor};
use crate::application::services::port_allocator::{self, PortRange};
use crate::application::services::provision::{
    self, PortSelection, ProvisionOptions, ProvisionOutcome,
};
use crate::application::services::validator;
use crate::domain::enrollment::NightwatchEnv;
use crate::domain::error::ProvisionError;
use crate::domain::host::HostConfig;

pub const TOKEN_PROMPT: &str = "Enter your Nightwatch token:";
pub const PROCEED_PROMPT: &str = "Do you want to proceed?";

pub struct EnrollOptions<'a> {
    /// Token given on the command line; prompted for when `None`.
    pub token: Option<&'a str>,
    pub sample_rate: &'a str,
    pub range: PortRange,
    /// Provisioning switches; the port selection is overridden.
    pub provision: ProvisionOptions<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "enrollment", rename_all = "kebab-case")]
pub enum EnrollOutcome {
    /// The user stopped before anything changed.
    Cancelled { port: u16 },
    Provisioned {
        port: u16,
        outcome: ProvisionOutcome,
    },
}

/// Enroll `host` with Nightwatch.
///
/// # Errors
///
/// Returns [`ProvisionError::PreconditionFailed`] before any change,
/// [`ProvisionError::TokenRequired`] for an empty token, and any error from
/// port discovery, the `.env` update or provisioning.
pub async fn enroll(
    remote: &impl RemoteExecutor,
    fs: &impl LocalFs,
    prompter: &impl Prompter,
    reporter: &impl ProgressReporter,
    host: &mut HostConfig,
    opts: EnrollOptions<'_>,
) -> Result<EnrollOutcome> {
    reporter.step("Starting interactive Nightwatch setup...");
    validator::validate_environment(remote, host, reporter).await?;
    let port = port_allocator::find_available_port(remote, host, opts.range, reporter).await?;

    let token = match opts.token {
        Some(token) => token.to_string(),
        None => prompter.input(TOKEN_PROMPT)?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(ProvisionError::TokenRequired.into());
    }

    let env = NightwatchEnv {
        token,
        sample_rate: opts.sample_rate.to_string(),
        port,
    };
    reporter.step("Configuration to be added:");
    for line in env.display_lines() {
        reporter.step(&format!("  {line}"));
    }
    if !prompter.confirm(PROCEED_PROMPT, true)? {
        reporter.warn("Setup cancelled.");
        return Ok(EnrollOutcome::Cancelled { port });
    }

    let env_path = host.shared_env_path();
    reporter.step(&format!("Updating {env_path} (backup: {env_path}.backup)"));
    for command in env.patch_commands(&env_path) {
        remote.run(&command).await?;
    }
    reporter.success(".env file updated with Nightwatch configuration");

    let provision_opts = ProvisionOptions {
        port: PortSelection::Configured,
        ..opts.provision
    };
    let outcome =
        provision::provision_validated(remote, fs, prompter, reporter, host, &provision_opts)
            .await?;
    Ok(EnrollOutcome::Provisioned { port, outcome })
}
