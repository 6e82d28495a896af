//! `nightwatch-deploy enroll`: interactive Nightwatch onboarding.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::enroll::{self, EnrollOptions, EnrollOutcome};
use crate::application::services::port_allocator::PortRange;
use crate::application::services::provision::{PortSelection, ProvisionOutcome};
use crate::commands::{HostReport, Pipeline, PipelineArgs, describe_outcome};
use crate::domain::enrollment::DEFAULT_SAMPLE_RATE;
use crate::output::json;

/// Arguments for the `enroll` command.
#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// Nightwatch token; prompted for when omitted
    #[arg(long, env = "NIGHTWATCH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request sample rate written to the .env
    #[arg(long, default_value = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Enroll every selected host.
///
/// # Errors
///
/// Returns the first fatal error, including a missing token.
pub async fn run(app: &AppContext, args: &EnrollArgs) -> Result<ExitCode> {
    let (inventory, hosts) = app.load_hosts()?;
    let pipeline = Pipeline::resolve(&args.pipeline, &inventory.nightwatch, &app.workdir)?;
    let reporter = app.reporter();
    let prompter = app.prompter();
    let fs = app.fs();

    let mut reports = Vec::with_capacity(hosts.len());
    let mut aborted = false;
    for mut host in hosts {
        app.output.host(host.alias());
        let remote = app.remote(&host, &inventory);
        let range = PortRange::default();
        let outcome = enroll::enroll(
            &remote,
            &fs,
            &prompter,
            &reporter,
            &mut host,
            EnrollOptions {
                token: args.token.as_deref(),
                sample_rate: &args.sample_rate,
                range,
                provision: pipeline.options(PortSelection::Discover(range)),
            },
        )
        .await?;

        match &outcome {
            EnrollOutcome::Cancelled { .. } => app.output.note("enrollment cancelled"),
            EnrollOutcome::Provisioned { outcome, .. } => match outcome {
                ProvisionOutcome::Aborted { .. } => {
                    aborted = true;
                    app.output.error(&describe_outcome(outcome));
                }
                ProvisionOutcome::Installed { .. } => app.output.success(&describe_outcome(outcome)),
                ProvisionOutcome::Declined => app.output.note(&describe_outcome(outcome)),
            },
        }
        reports.push(HostReport {
            host: host.alias().to_string(),
            result: outcome,
        });
    }

    if app.is_json() {
        json::print(&reports)?;
    }
    Ok(if aborted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
