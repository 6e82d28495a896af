//! `nightwatch-deploy status`: supervisor state of the agent unit.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::installer;
use crate::commands::HostReport;
use crate::domain::supervisor::UnitState;
use crate::output::json;

/// Query each selected host's unit.
///
/// # Errors
///
/// Returns an error if the inventory cannot be loaded or a host cannot be
/// reached.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (inventory, hosts) = app.load_hosts()?;
    let mut reports = Vec::with_capacity(hosts.len());

    for host in hosts {
        let remote = app.remote(&host, &inventory);
        let status = installer::query_unit(&remote, &host).await?;
        let line = format!("{} ({})", status.state.as_str(), status.unit);
        match status.state {
            UnitState::Running => app.output.success(&format!("{}: {line}", host.alias())),
            _ => app.output.warn(&format!("{}: {line}", host.alias())),
        }
        reports.push(HostReport {
            host: host.alias().to_string(),
            result: status,
        });
    }

    if app.is_json() {
        json::print(&reports)?;
    }
    Ok(ExitCode::SUCCESS)
}
