//! Upload the compiled config and register it with the supervisor.

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::application::services::compiler::CompiledArtifact;
use crate::domain::error::ProvisionError;
use crate::domain::host::HostConfig;
use crate::domain::shell::quote;
use crate::domain::supervisor::{
    InstalledStatus, STATUS_UNAVAILABLE_MARKER, UnitState, classify_status,
};

/// Command that prints the supervisor status of `unit`, never failing.
#[must_use]
pub fn status_command(unit: &str) -> String {
    format!(
        "sudo supervisorctl status {} || echo '{STATUS_UNAVAILABLE_MARKER}'",
        quote(unit)
    )
}

/// Query and classify the supervisor state of the host's unit.
///
/// # Errors
///
/// Returns the transport error if the status command cannot be executed.
pub async fn query_unit(remote: &impl RemoteExecutor, host: &HostConfig) -> Result<InstalledStatus> {
    let unit = host.unit_name();
    let raw = remote
        .run(&status_command(&unit))
        .await
        .with_context(|| format!("querying supervisor status of {unit}"))?;
    Ok(InstalledStatus {
        state: classify_status(&raw),
        raw_status: raw.trim().to_string(),
        unit,
    })
}

/// Upload `artifact`, hand it to the helper script and check the unit.
///
/// On helper failure the uploaded file is removed (best effort) before the
/// error is returned. A unit that is not running afterwards is a warning,
/// not an error.
///
/// # Errors
///
/// Returns the upload error, or [`ProvisionError::InstallationFailed`] when
/// the helper script fails.
pub async fn install(
    remote: &impl RemoteExecutor,
    artifact: &CompiledArtifact,
    host: &HostConfig,
    reporter: &impl ProgressReporter,
) -> Result<InstalledStatus> {
    let unit = host.unit_name();
    let remote_path = host.remote_upload_path();
    reporter.step(&format!("Configuring Nightwatch for {}", host.alias()));

    remote
        .upload(&artifact.path, &remote_path)
        .await
        .with_context(|| format!("uploading {} to {remote_path}", artifact.path.display()))?;

    let register = format!(
        "sudo {} {} {}",
        quote(&host.supervisor_deploy_script()),
        quote(&remote_path),
        quote(&unit)
    );
    if let Err(e) = remote.run(&register).await {
        reporter.warn(&format!("Failed to configure Nightwatch: {e:#}"));
        if let Err(cleanup) = remote.run(&format!("rm -f {}", quote(&remote_path))).await {
            tracing::warn!(path = %remote_path, error = %cleanup, "could not remove uploaded config");
        }
        return Err(ProvisionError::InstallationFailed {
            unit,
            reason: format!("{e:#}"),
        }
        .into());
    }
    reporter.success(&format!(
        "Nightwatch configured successfully for {}",
        host.sanitized_hostname()
    ));

    let status = match query_unit(remote, host).await {
        Ok(status) => status,
        Err(e) => InstalledStatus {
            unit,
            state: UnitState::Unknown,
            raw_status: format!("{e:#}"),
        },
    };
    if status.is_running() {
        reporter.success("Nightwatch agent is running");
    } else {
        reporter.warn(&format!("Nightwatch agent status: {}", status.raw_status));
    }
    Ok(status)
}
