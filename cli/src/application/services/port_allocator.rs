//! Free-port discovery on the remote host.
//!
//! Ports are probed in ascending order against the remote socket table and
//! the lowest free one wins. Nothing is reserved: another process may bind
//! the port between discovery and the agent starting.

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteExecutor};
use crate::domain::error::ProvisionError;
use crate::domain::host::{DEFAULT_NIGHTWATCH_PORT, HostConfig, KEY_NIGHTWATCH_PORT};

/// Last port considered by default (inclusive).
pub const PORT_RANGE_END: u16 = 3048;

/// Inclusive range of candidate ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: DEFAULT_NIGHTWATCH_PORT,
            end: PORT_RANGE_END,
        }
    }
}

/// Shell condition that succeeds when something listens on `port`.
#[must_use]
pub fn probe_command(port: u16) -> String {
    format!(
        "netstat -tuln 2>/dev/null | grep -q ':{port} ' || ss -tuln 2>/dev/null | grep -q ':{port} '"
    )
}

/// Find the lowest free port in `range` and record it as `nightwatch_port`.
///
/// # Errors
///
/// Returns [`ProvisionError::NoPortAvailable`] when every port is in use,
/// leaving `host` untouched, or the transport error of a failed probe.
pub async fn find_available_port(
    remote: &impl RemoteExecutor,
    host: &mut HostConfig,
    range: PortRange,
    reporter: &impl ProgressReporter,
) -> Result<u16> {
    reporter.step(&format!(
        "Searching for available port starting from {}...",
        range.start
    ));

    for port in range.start..=range.end {
        if !remote.test(&probe_command(port)).await? {
            tracing::info!(host = host.alias(), port, "found available port");
            reporter.success(&format!("Found available port: {port}"));
            host.set(KEY_NIGHTWATCH_PORT, port);
            return Ok(port);
        }
        tracing::debug!(host = host.alias(), port, "port in use");
    }

    Err(ProvisionError::NoPortAvailable {
        start: range.start,
        end: range.end,
    }
    .into())
}
