//! `nightwatch-deploy find-port`: report the first free agent port per host.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::port_allocator::{self, PortRange};
use crate::commands::HostReport;
use crate::output::{json, progress};

#[derive(Debug, Serialize)]
struct FoundPort {
    port: u16,
}

/// Probe each selected host in turn.
///
/// # Errors
///
/// Returns an error if a host has no free port in range or cannot be reached.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (inventory, hosts) = app.load_hosts()?;
    let reporter = app.reporter();
    let mut reports = Vec::with_capacity(hosts.len());

    for mut host in hosts {
        let remote = app.remote(&host, &inventory);
        let pb = progress::spinner_if(
            app.output.show_progress(),
            &format!("Probing ports on {}", host.alias()),
        );
        let found =
            port_allocator::find_available_port(&remote, &mut host, PortRange::default(), &reporter)
                .await;
        progress::finish_clear(&pb);
        let port = found?;
        app.output.field(host.alias(), &port.to_string());
        reports.push(HostReport {
            host: host.alias().to_string(),
            result: FoundPort { port },
        });
    }

    if app.is_json() {
        json::print(&reports)?;
    }
    Ok(ExitCode::SUCCESS)
}
