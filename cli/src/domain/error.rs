//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Errors raised by the Nightwatch provisioning pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A remote precondition is not met. The message names the remediation.
    #[error("{0}")]
    PreconditionFailed(String),

    #[error("No available ports found between {start} and {end}")]
    NoPortAvailable { start: u16, end: u16 },

    #[error("Failed to create compiled config: {}", path.display())]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Nightwatch template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Failed to configure Nightwatch unit '{unit}': {reason}")]
    InstallationFailed { unit: String, reason: String },

    #[error("Nightwatch token is required")]
    TokenRequired,
}

impl ProvisionError {
    /// Returns `true` for failures the orchestrator turns into an aborted
    /// outcome instead of propagating.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::ArtifactWriteFailed { .. } | Self::TemplateNotFound { .. }
        )
    }

    /// Stable code used in `--json` error objects.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PreconditionFailed(_) => "PRECONDITION_FAILED",
            Self::NoPortAvailable { .. } => "NO_PORT_AVAILABLE",
            Self::ArtifactWriteFailed { .. } => "ARTIFACT_WRITE_FAILED",
            Self::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Self::InstallationFailed { .. } => "INSTALLATION_FAILED",
            Self::TokenRequired => "TOKEN_REQUIRED",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to the deployment inventory.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Inventory defines no hosts: {}", path.display())]
    NoHosts { path: PathBuf },

    #[error("Unknown host '{alias}'\n\nKnown hosts: {known}")]
    UnknownHost { alias: String, known: String },

    #[error("Host '{alias}' is missing required setting '{key}'")]
    MissingKey { alias: String, key: String },

    #[error("Invalid value for {key} on host '{alias}': {value}")]
    InvalidValue {
        alias: String,
        key: String,
        value: String,
    },
}

impl ConfigError {
    /// Stable code used in `--json` error objects.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoHosts { .. } => "NO_HOSTS",
            Self::UnknownHost { .. } => "UNKNOWN_HOST",
            Self::MissingKey { .. } | Self::InvalidValue { .. } => "INVALID_CONFIG",
        }
    }
}
