//! `nightwatch-deploy setup`: provision the agent on every selected host.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::port_allocator::PortRange;
use crate::application::services::provision::{self, PortSelection, ProvisionOutcome};
use crate::commands::{HostReport, Pipeline, PipelineArgs, describe_outcome};
use crate::domain::host::KEY_NIGHTWATCH_PORT;
use crate::output::json;

/// Arguments for the `setup` command.
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Use this agent port instead of probing for a free one
    #[arg(long)]
    pub port: Option<u16>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Run the provisioning pipeline host by host.
///
/// # Errors
///
/// Returns the first fatal error; hosts after it are not touched.
pub async fn run(app: &AppContext, args: &SetupArgs) -> Result<ExitCode> {
    let (inventory, hosts) = app.load_hosts()?;
    let pipeline = Pipeline::resolve(&args.pipeline, &inventory.nightwatch, &app.workdir)?;
    let selection = match args.port {
        Some(_) => PortSelection::Configured,
        None => PortSelection::Discover(PortRange::default()),
    };
    let reporter = app.reporter();
    let prompter = app.prompter();
    let fs = app.fs();

    let mut reports = Vec::with_capacity(hosts.len());
    let mut aborted = false;
    for mut host in hosts {
        app.output.host(host.alias());
        if let Some(port) = args.port {
            host.set(KEY_NIGHTWATCH_PORT, port);
        }
        let remote = app.remote(&host, &inventory);
        let outcome = provision::provision(
            &remote,
            &fs,
            &prompter,
            &reporter,
            &mut host,
            &pipeline.options(selection),
        )
        .await?;

        match &outcome {
            ProvisionOutcome::Installed { .. } => app.output.success(&describe_outcome(&outcome)),
            ProvisionOutcome::Declined => app.output.note(&describe_outcome(&outcome)),
            ProvisionOutcome::Aborted { .. } => {
                aborted = true;
                app.output.error(&describe_outcome(&outcome));
            }
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
