//! Deployment inventory schema and host resolution.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::host::{ConfigValue, HostConfig, KEY_DEPLOY_PATH, KEY_NIGHTWATCH_PORT};
use crate::domain::template::{MissingTemplatePolicy, TEMPLATE_FILE_NAME};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_INVENTORY_FILE: &str = "deploy.yaml";
pub const DEFAULT_SSH_TIMEOUT_SECS: u64 = 120;

// ── Inventory schema ─────────────────────────────────────────────────────────

/// Top-level inventory stored in `deploy.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Inventory {
    /// Shared second-tier values for every host.
    pub defaults: BTreeMap<String, ConfigValue>,
    /// Hosts keyed by alias; each map holds the host's own values.
    pub hosts: BTreeMap<String, BTreeMap<String, ConfigValue>>,
    pub nightwatch: PipelineSettings,
    pub ssh: SshSettings,
}

/// Pipeline switches shared by all hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Template path, relative to the working directory.
    pub template: PathBuf,
    pub missing_template: MissingTemplatePolicy,
    /// Clear the framework cache before provisioning and rebuild it after.
    pub optimize_cache: bool,
    /// Ask the application for the agent status after installing.
    pub app_status: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            template: PathBuf::from(TEMPLATE_FILE_NAME),
            missing_template: MissingTemplatePolicy::default(),
            optimize_cache: false,
            app_status: false,
        }
    }
}

/// Transport settings for the SSH executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub timeout_secs: u64,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_SSH_TIMEOUT_SECS,
        }
    }
}

impl Inventory {
    /// Fold environment-derived defaults in beneath the inventory defaults.
    ///
    /// `NIGHTWATCH_PORT` only applies when the inventory does not set
    /// `nightwatch_port` itself.
    pub fn apply_env_defaults(&mut self, nightwatch_port: Option<&str>) {
        if let Some(port) = nightwatch_port.map(str::trim).filter(|p| !p.is_empty()) {
            self.defaults
                .entry(KEY_NIGHTWATCH_PORT.to_string())
                .or_insert_with(|| ConfigValue::from(port));
        }
    }

    /// Resolve the selected hosts, or every host when `selection` is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the inventory is empty, an alias is
    /// unknown, or a host lacks a required or well-formed setting.
    pub fn resolve_hosts(
        &self,
        selection: &[String],
        source: &Path,
    ) -> Result<Vec<HostConfig>, ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::NoHosts {
                path: source.to_path_buf(),
            });
        }
        let aliases: Vec<&String> = if selection.is_empty() {
            self.hosts.keys().collect()
        } else {
            selection.iter().collect()
        };
        aliases
            .into_iter()
            .map(|alias| self.resolve_host(alias))
            .collect()
    }

    fn resolve_host(&self, alias: &str) -> Result<HostConfig, ConfigError> {
        let own = self
            .hosts
            .get(alias)
            .ok_or_else(|| ConfigError::UnknownHost {
                alias: alias.to_string(),
                known: self.hosts.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        let host = HostConfig::new(alias, own.clone(), self.defaults.clone());
        validate_host(&host)?;
        Ok(host)
    }
}

fn validate_host(host: &HostConfig) -> Result<(), ConfigError> {
    if host.deploy_path().is_empty() {
        return Err(ConfigError::MissingKey {
            alias: host.alias().to_string(),
            key: KEY_DEPLOY_PATH.to_string(),
        });
    }
    if let Some(value) = host.get(KEY_NIGHTWATCH_PORT) {
        if value.as_port().is_none() {
            return Err(ConfigError::InvalidValue {
                alias: host.alias().to_string(),
                key: KEY_NIGHTWATCH_PORT.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
