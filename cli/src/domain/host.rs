//! Per-host configuration with two lookup tiers.
//!
//! Pure functions only: no I/O, no async, no filesystem access.
//!
//! A [`HostConfig`] is resolved once from the inventory and then passed by
//! reference through every pipeline stage. Stages that record a result (the
//! port allocator) take `&mut HostConfig`; everything else reads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const KEY_HOSTNAME: &str = "hostname";
pub const KEY_DEPLOY_PATH: &str = "deploy_path";
pub const KEY_CURRENT_PATH: &str = "current_path";
pub const KEY_BIN_PHP: &str = "bin/php";
pub const KEY_NIGHTWATCH_PORT: &str = "nightwatch_port";
pub const KEY_SUPERVISOR_DEPLOY_SCRIPT: &str = "supervisor_deploy_script";
pub const KEY_REMOTE_USER: &str = "remote_user";
pub const KEY_SSH_PORT: &str = "port";
pub const KEY_IDENTITY_FILE: &str = "identity_file";

pub const DEFAULT_NIGHTWATCH_PORT: u16 = 2048;
pub const DEFAULT_SUPERVISOR_DEPLOY_SCRIPT: &str = "/usr/local/bin/deploy-supervisor-config";
pub const DEFAULT_BIN_PHP: &str = "php";

/// Directory the supervisor daemon reads program definitions from.
pub const SUPERVISOR_CONF_DIR: &str = "/etc/supervisor/conf.d";

// ── Values ───────────────────────────────────────────────────────────────────

/// A scalar inventory value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ConfigValue {
    /// Interpret the value as a TCP port, accepting numeric strings.
    #[must_use]
    pub fn as_port(&self) -> Option<u16> {
        match self {
            Self::Int(n) => u16::try_from(*n).ok(),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<u16> for ConfigValue {
    fn from(n: u16) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// ── HostConfig ───────────────────────────────────────────────────────────────

/// Configuration for one deployment target.
///
/// Lookups consult the host's own values first, then the shared defaults.
/// Reading an unset key never fails: typed accessors fall back to built-in
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    alias: String,
    own: BTreeMap<String, ConfigValue>,
    defaults: BTreeMap<String, ConfigValue>,
}

impl HostConfig {
    /// Build a host from its inventory alias, own values and shared defaults.
    #[must_use]
    pub fn new(
        alias: impl Into<String>,
        own: BTreeMap<String, ConfigValue>,
        defaults: BTreeMap<String, ConfigValue>,
    ) -> Self {
        Self {
            alias: alias.into(),
            own,
            defaults,
        }
    }

    /// Inventory alias the host is listed under.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Look up `key` in the host's own values, then in the defaults.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.own.get(key).or_else(|| self.defaults.get(key))
    }

    /// Look up `key`, falling back to `default` when neither tier has it.
    #[must_use]
    pub fn get_or(&self, key: &str, default: impl Into<ConfigValue>) -> ConfigValue {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Record `value` under `key` in the host's own tier.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.own.insert(key.into(), value.into());
    }

    /// The host-specific overrides, excluding shared defaults.
    #[must_use]
    pub fn own_values(&self) -> &BTreeMap<String, ConfigValue> {
        &self.own
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Network hostname; defaults to the alias.
    #[must_use]
    pub fn hostname(&self) -> String {
        self.get_string(KEY_HOSTNAME)
            .unwrap_or_else(|| self.alias.clone())
    }

    /// Hostname with dots removed, used to build file and unit names.
    #[must_use]
    pub fn sanitized_hostname(&self) -> String {
        sanitize_hostname(&self.hostname())
    }

    /// Deployment root on the remote host. Empty when unset; the inventory
    /// loader rejects hosts without it.
    #[must_use]
    pub fn deploy_path(&self) -> String {
        self.get_string(KEY_DEPLOY_PATH)
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_default()
    }

    /// Path of the live release; defaults to `<deploy_path>/current`.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.get_string(KEY_CURRENT_PATH)
            .unwrap_or_else(|| format!("{}/current", self.deploy_path()))
    }

    /// PHP binary on the remote host.
    #[must_use]
    pub fn bin_php(&self) -> String {
        self.get_string(KEY_BIN_PHP)
            .unwrap_or_else(|| DEFAULT_BIN_PHP.to_string())
    }

    /// Port the Nightwatch agent listens on.
    #[must_use]
    pub fn nightwatch_port(&self) -> u16 {
        self.get(KEY_NIGHTWATCH_PORT)
            .and_then(ConfigValue::as_port)
            .unwrap_or(DEFAULT_NIGHTWATCH_PORT)
    }

    /// Privileged helper script that installs supervisor program files.
    #[must_use]
    pub fn supervisor_deploy_script(&self) -> String {
        self.get_string(KEY_SUPERVISOR_DEPLOY_SCRIPT)
            .unwrap_or_else(|| DEFAULT_SUPERVISOR_DEPLOY_SCRIPT.to_string())
    }

    /// SSH login user, if configured.
    #[must_use]
    pub fn remote_user(&self) -> Option<String> {
        self.get_string(KEY_REMOTE_USER)
    }

    /// SSH port, if configured.
    #[must_use]
    pub fn ssh_port(&self) -> Option<u16> {
        self.get(KEY_SSH_PORT).and_then(ConfigValue::as_port)
    }

    /// SSH identity file, if configured.
    #[must_use]
    pub fn identity_file(&self) -> Option<String> {
        self.get_string(KEY_IDENTITY_FILE)
    }

    /// Supervisor unit managed for this host.
    #[must_use]
    pub fn unit_name(&self) -> String {
        format!("{}-nightwatch-agent", self.sanitized_hostname())
    }

    /// File name shared by the compiled artifact, the uploaded copy and the
    /// supervisor program file.
    #[must_use]
    pub fn config_file_name(&self) -> String {
        format!("{}.conf", self.sanitized_hostname())
    }

    /// Upload destination for the compiled config.
    #[must_use]
    pub fn remote_upload_path(&self) -> String {
        format!("{}/{}", self.deploy_path(), self.config_file_name())
    }

    /// Where the helper script installs the program definition.
    #[must_use]
    pub fn supervisor_config_path(&self) -> String {
        format!("{SUPERVISOR_CONF_DIR}/{}", self.config_file_name())
    }

    /// Shared `.env` of the application.
    #[must_use]
    pub fn shared_env_path(&self) -> String {
        format!("{}/shared/.env", self.deploy_path())
    }
}

/// Remove the dots from a hostname (`web01.example.com` → `web01examplecom`).
#[must_use]
pub fn sanitize_hostname(hostname: &str) -> String {
    hostname.replace('.', "")
}
