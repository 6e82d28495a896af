//! Remote precondition checks run before anything is changed.
//!
//! Checks run cheapest first and stop at the first failure. Each failure
//! message names the fix.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::domain::error::ProvisionError;
use crate::domain::host::{HostConfig, SUPERVISOR_CONF_DIR};
use crate::domain::shell::quote;

struct Check {
    condition: String,
    failure: String,
}

fn checks(host: &HostConfig) -> [Check; 4] {
    let script = host.supervisor_deploy_script();
    let quoted = quote(&script);
    [
        Check {
            condition: "pgrep supervisord > /dev/null".to_string(),
            failure: "Supervisor is installed but not running. Start it with: sudo systemctl start supervisor"
                .to_string(),
        },
        Check {
            condition: format!("[ -f {quoted} ]"),
            failure: format!("Deploy script not found: {script}. Install the wrapper script first."),
        },
        Check {
            condition: format!("[ -x {quoted} ]"),
            failure: format!(
                "Deploy script is not executable: {script}. Fix it with: sudo chmod +x {script}"
            ),
        },
        Check {
            condition: format!("[ -d {SUPERVISOR_CONF_DIR} ]"),
            failure: format!("Supervisor config directory not found: {SUPERVISOR_CONF_DIR}"),
        },
    ]
}

/// Verify the supervisor, the helper script and the config directory.
///
/// # Errors
///
/// Returns [`ProvisionError::PreconditionFailed`] for the first unmet
/// condition, or the transport error of a failed probe.
pub async fn validate_environment(
    remote: &impl RemoteExecutor,
    host: &HostConfig,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step("Validating Nightwatch environment...");

    for check in checks(host) {
        if !remote.test(&check.condition).await? {
            tracing::info!(host = host.alias(), condition = %check.condition, "precondition failed");
            return Err(ProvisionError::PreconditionFailed(check.failure).into());
        }
    }

    reporter.success("Environment validated successfully");
    Ok(())
}
