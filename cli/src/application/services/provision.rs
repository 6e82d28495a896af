//! Application service: Nightwatch provisioning use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Stages: validate → discover port → compile → existing-config check →
//! install → verify. The compiled artifact is owned by an [`ArtifactGuard`]
//! from before it is written until the use-case returns, so it is removed on
//! every exit path, including errors.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{LocalFs, ProgressReporter, Prompter, RemoteExecutor};
use crate::application::services::compiler::{self, TemplateSource};
use crate::application::services::installer;
use crate::application::services::port_allocator::{self, PortRange};
use crate::application::services::validator;
use crate::domain::error::ProvisionError;
use crate::domain::host::HostConfig;
use crate::domain::shell::quote;
use crate::domain::supervisor::InstalledStatus;
use crate::domain::template::MissingTemplatePolicy;

pub const REPLACE_PROMPT: &str = "Supervisor config exists, do you want to replace it?";

/// How the agent port is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSelection {
    /// Probe the remote host for the lowest free port.
    Discover(PortRange),
    /// Keep the host's `nightwatch_port`.
    Configured,
}

/// Switches for one provisioning run.
pub struct ProvisionOptions<'a> {
    pub template: &'a Path,
    pub missing_template: MissingTemplatePolicy,
    pub bundled_template: &'a str,
    /// Directory the compiled artifact is written to.
    pub workdir: &'a Path,
    pub port: PortSelection,
    /// Clear the framework cache before installing and rebuild it after.
    pub optimize_cache: bool,
    /// Ask the application for the agent status after installing.
    pub app_status: bool,
}

/// Outcome of the `provision` use-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ProvisionOutcome {
    /// The unit was installed; `status.state` tells whether it runs.
    Installed { port: u16, status: InstalledStatus },
    /// A supervisor config existed and the user kept it.
    Declined,
    /// A soft failure ended the run early.
    Aborted { reason: String },
}

/// Removes the local compiled artifact when dropped.
pub struct ArtifactGuard<'a, F: LocalFs> {
    fs: &'a F,
    path: PathBuf,
}

impl<'a, F: LocalFs> ArtifactGuard<'a, F> {
    pub fn new(fs: &'a F, path: PathBuf) -> Self {
        Self { fs, path }
    }
}

impl<F: LocalFs> Drop for ArtifactGuard<'_, F> {
    fn drop(&mut self) {
        if let Err(e) = self.fs.remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove compiled config");
        }
    }
}

fn artisan(host: &HostConfig, args: &str) -> String {
    format!(
        "cd {} && {} artisan {args}",
        quote(&host.current_path()),
        quote(&host.bin_php())
    )
}

/// Provision the Nightwatch agent on `host`.
///
/// Accepts port trait bounds so the caller can inject real or mock
/// implementations. The service never touches any presentation type.
///
/// # Errors
///
/// Returns an error on failed preconditions, port exhaustion, helper script
/// failure or any transport error. Template and artifact-write problems end
/// the run with [`ProvisionOutcome::Aborted`] instead.
pub async fn provision(
    remote: &impl RemoteExecutor,
    fs: &impl LocalFs,
    prompter: &impl Prompter,
    reporter: &impl ProgressReporter,
    host: &mut HostConfig,
    opts: &ProvisionOptions<'_>,
) -> Result<ProvisionOutcome> {
    validator::validate_environment(remote, host, reporter).await?;
    provision_validated(remote, fs, prompter, reporter, host, opts).await
}

/// Run every stage after the precondition gate.
///
/// Callers must have run [`validator::validate_environment`] on `host`
/// before changing anything on it.
///
/// # Errors
///
/// As [`provision`], minus the precondition failures.
pub async fn provision_validated(
    remote: &impl RemoteExecutor,
    fs: &impl LocalFs,
    prompter: &impl Prompter,
    reporter: &impl ProgressReporter,
    host: &mut HostConfig,
    opts: &ProvisionOptions<'_>,
) -> Result<ProvisionOutcome> {
    if let PortSelection::Discover(range) = opts.port {
        port_allocator::find_available_port(remote, host, range, reporter).await?;
    }
    let port = host.nightwatch_port();
    tracing::info!(host = host.alias(), port, "port selected");

    if opts.optimize_cache {
        remote.run(&artisan(host, "optimize:clear")).await?;
    }

    let _guard = ArtifactGuard::new(fs, compiler::artifact_path(opts.workdir, host));
    let source = TemplateSource {
        path: opts.template,
        policy: opts.missing_template,
        bundled: opts.bundled_template,
    };
    let artifact = match compiler::compile(fs, &source, host, opts.workdir, reporter) {
        Ok(artifact) => artifact,
        Err(e) => match e.downcast_ref::<ProvisionError>() {
            Some(soft) if soft.is_soft() => {
                reporter.warn(&soft.to_string());
                return Ok(ProvisionOutcome::Aborted {
                    reason: soft.to_string(),
                });
            }
            _ => return Err(e),
        },
    };

    let supervisor_conf = host.supervisor_config_path();
    reporter.step(&format!("Checking {supervisor_conf}"));
    if remote.test(&format!("[ -f {} ]", quote(&supervisor_conf))).await?
        && !prompter.confirm(REPLACE_PROMPT, false)?
    {
        reporter.warn(&format!(
            "Nightwatch is already configured for {}",
            host.alias()
        ));
        return Ok(ProvisionOutcome::Declined);
    }

    let status = installer::install(remote, &artifact, host, reporter).await?;

    if opts.app_status {
        remote.run(&artisan(host, "nightwatch:status")).await?;
    }
    if opts.optimize_cache {
        remote.run(&artisan(host, "optimize")).await?;
    }

    Ok(ProvisionOutcome::Installed { port, status })
}
