//! Command implementations

pub mod enroll;
pub mod find_port;
pub mod hosts;
pub mod init;
pub mod setup;
pub mod status;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::application::services::provision::{PortSelection, ProvisionOptions, ProvisionOutcome};
use crate::domain::config::PipelineSettings;
use crate::domain::template::MissingTemplatePolicy;
use crate::infra::assets;

/// Provisioning switches shared by `setup` and `enroll`.
#[derive(Args, Debug, Default)]
pub struct PipelineArgs {
    /// Run `artisan optimize:clear` before and `artisan optimize` after installing
    #[arg(long)]
    pub optimize_cache: bool,

    /// Run `artisan nightwatch:status` after installing
    #[arg(long)]
    pub app_status: bool,

    /// Template to compile [default: ./.nightwatch]
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Abort instead of using the bundled template when the template is missing
    #[arg(long)]
    pub strict_template: bool,
}

/// Owned provisioning settings, merged from flags and the inventory.
pub struct Pipeline {
    template: PathBuf,
    missing_template: MissingTemplatePolicy,
    bundled: &'static str,
    workdir: PathBuf,
    optimize_cache: bool,
    app_status: bool,
}

impl Pipeline {
    /// Flags win over the inventory; relative templates resolve against
    /// `workdir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled template cannot be loaded.
    pub fn resolve(args: &PipelineArgs, settings: &PipelineSettings, workdir: &Path) -> Result<Self> {
        let template = args.template.as_ref().unwrap_or(&settings.template);
        Ok(Self {
            template: workdir.join(template),
            missing_template: if args.strict_template {
                MissingTemplatePolicy::Abort
            } else {
                settings.missing_template
            },
            bundled: assets::bundled_template()?,
            workdir: workdir.to_path_buf(),
            optimize_cache: args.optimize_cache || settings.optimize_cache,
            app_status: args.app_status || settings.app_status,
        })
    }

    #[must_use]
    pub fn options(&self, port: PortSelection) -> ProvisionOptions<'_> {
        ProvisionOptions {
            template: &self.template,
            missing_template: self.missing_template,
            bundled_template: self.bundled,
            workdir: &self.workdir,
            port,
            optimize_cache: self.optimize_cache,
            app_status: self.app_status,
        }
    }
}

/// One line of a multi-host JSON report.
#[derive(Debug, Serialize)]
pub struct HostReport<T: Serialize> {
    pub host: String,
    #[serde(flatten)]
    pub result: T,
}

/// Human summary line for a provisioning outcome.
#[must_use]
pub fn describe_outcome(outcome: &ProvisionOutcome) -> String {
    match outcome {
        ProvisionOutcome::Installed { port, status } => {
            format!("agent installed on port {port} ({})", status.state.as_str())
        }
        ProvisionOutcome::Declined => "existing configuration kept".to_string(),
        ProvisionOutcome::Aborted { reason } => format!("aborted: {reason}"),
    }
}
