//! Supervisor unit state as reported by `supervisorctl status`.
//!
//! Pure functions only: no I/O, no async.

use serde::Serialize;

/// Marker echoed when `supervisorctl status` itself fails.
pub const STATUS_UNAVAILABLE_MARKER: &str = "UNIT_STATUS_UNAVAILABLE";

/// Observed state of a supervisor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitState {
    /// Supervisor does not know the unit.
    Absent,
    /// The unit exists but is stopped, starting, backing off or failed.
    ConfiguredNotRunning,
    Running,
    /// The status query could not be executed.
    Unknown,
}

impl UnitState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::ConfiguredNotRunning => "configured-not-running",
            Self::Running => "running",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify raw `supervisorctl status <unit>` output.
///
/// A unit is running when the output contains `RUNNING`, e.g.
/// `web01-nightwatch-agent   RUNNING   pid 4242, uptime 0:01:02`.
/// [`STATUS_UNAVAILABLE_MARKER`] must never contain it.
#[must_use]
pub fn classify_status(raw: &str) -> UnitState {
    if raw.contains("RUNNING") {
        return UnitState::Running;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.contains(STATUS_UNAVAILABLE_MARKER)
        || trimmed.contains("no such process")
    {
        return UnitState::Absent;
    }
    UnitState::ConfiguredNotRunning
}

/// Result of installing the agent unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledStatus {
    pub unit: String,
    pub state: UnitState,
    /// Raw status text, kept for the warning shown when not running.
    pub raw_status: String,
}

impl InstalledStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == UnitState::Running
    }
}
