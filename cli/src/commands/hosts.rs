//! `nightwatch-deploy hosts`: show the resolved host settings.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::commands::HostReport;
use crate::domain::host::HostConfig;
use crate::output::json;

#[derive(Debug, Serialize)]
struct HostSummary {
    hostname: String,
    deploy_path: String,
    current_path: String,
    nightwatch_port: u16,
    unit: String,
    supervisor_config: String,
}

impl From<&HostConfig> for HostSummary {
    fn from(host: &HostConfig) -> Self {
        Self {
            hostname: host.hostname(),
            deploy_path: host.deploy_path(),
            current_path: host.current_path(),
            nightwatch_port: host.nightwatch_port(),
            unit: host.unit_name(),
            supervisor_config: host.supervisor_config_path(),
        }
    }
}

/// List the selected hosts. Makes no remote calls.
///
/// # Errors
///
/// Returns an error if the inventory cannot be loaded.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let (_, hosts) = app.load_hosts()?;
    let reports: Vec<_> = hosts
        .iter()
        .map(|host| HostReport {
            host: host.alias().to_string(),
            result: HostSummary::from(host),
        })
        .collect();

    if app.is_json() {
        json::print(&reports)?;
        return Ok(ExitCode::SUCCESS);
    }
    for report in &reports {
        app.output.host(&report.host);
        app.output.field("hostname", &report.result.hostname);
        app.output.field("deploy_path", &report.result.deploy_path);
        app.output.field("nightwatch_port", &report.result.nightwatch_port.to_string());
        app.output.field("unit", &report.result.unit);
        app.output.field("supervisor_config", &report.result.supervisor_config);
    }
    Ok(ExitCode::SUCCESS)
}
