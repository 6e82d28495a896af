//! `nightwatch-deploy validate`: check supervisor prerequisites.
//!
//! A failed precondition on one host is reported and the next host is still
//! checked; transport errors stop the run.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::validator;
use crate::commands::HostReport;
use crate::domain::error::ProvisionError;
use crate::output::json;

#[derive(Debug, Serialize)]
struct Check {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Validate every selected host.
///
/// # Errors
///
/// Returns an error if the inventory cannot be loaded or a host cannot be
/// reached.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let (inventory, hosts) = app.load_hosts()?;
    let reporter = app.reporter();
    let mut reports = Vec::with_capacity(hosts.len());
    let mut failed = false;

    for host in hosts {
        app.output.host(host.alias());
        let remote = app.remote(&host, &inventory);
        let check = match validator::validate_environment(&remote, &host, &reporter).await {
            Ok(()) => Check {
                ok: true,
                reason: None,
            },
            Err(e) => match e.downcast_ref::<ProvisionError>() {
                Some(ProvisionError::PreconditionFailed(reason)) => {
                    app.output.error(reason);
                    Check {
                        ok: false,
                        reason: Some(reason.clone()),
                    }
                }
                _ => return Err(e),
            },
        };
        failed |= !check.ok;
        reports.push(HostReport {
            host: host.alias().to_string(),
            result: check,
        });
    }

    if app.is_json() {
        json::print(&reports)?;
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
