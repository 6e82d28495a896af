//! Inventory loading from `deploy.yaml` plus the `.env.deployer` overlay.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{DEFAULT_INVENTORY_FILE, Inventory};

/// Environment variable supplying the default agent port.
pub const PORT_ENV: &str = "NIGHTWATCH_PORT";
/// Deployer env file read from the inventory's directory.
pub const DEPLOYER_ENV_FILE: &str = ".env.deployer";

/// Reads the inventory from a YAML file on disk.
pub struct YamlInventoryStore {
    path: PathBuf,
}

impl YamlInventoryStore {
    /// Use the `--config` path (clap also fills it from
    /// `NIGHTWATCH_DEPLOY_CONFIG`), else `./deploy.yaml`.
    #[must_use]
    pub fn locate(config: Option<&Path>) -> Self {
        let path = config.map_or_else(|| PathBuf::from(DEFAULT_INVENTORY_FILE), Path::to_path_buf);
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the inventory, then fold in environment defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not valid YAML.
    pub fn load(&self) -> Result<Inventory> {
        let content = std::fs::read_to_string(&self.path).with_context(|| {
            format!(
                "cannot read inventory {} (set --config or NIGHTWATCH_DEPLOY_CONFIG)",
                self.path.display()
            )
        })?;
        let mut inventory = parse_inventory(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))?;
        let port = env_value(PORT_ENV, &self.deployer_env_path())?;
        inventory.apply_env_defaults(port.as_deref());
        Ok(inventory)
    }

    fn deployer_env_path(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(DEPLOYER_ENV_FILE)
    }
}

/// Parse inventory YAML. An empty document is an empty inventory.
///
/// # Errors
///
/// Returns the YAML error for malformed input.
pub fn parse_inventory(content: &str) -> Result<Inventory> {
    if content.trim().is_empty() {
        return Ok(Inventory::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Read `key` from the process environment, falling back to `env_file`.
///
/// The process environment wins. A missing env file is not an error.
///
/// # Errors
///
/// Returns an error if the env file exists but cannot be parsed.
pub fn env_value(key: &str, env_file: &Path) -> Result<Option<String>> {
    if let Ok(value) = std::env::var(key) {
        return Ok(Some(value));
    }
    let iter = match dotenvy::from_path_iter(env_file) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("cannot read {}", env_file.display()));
        }
    };
    for item in iter {
        let (name, value) = item.with_context(|| format!("cannot parse {}", env_file.display()))?;
        if name == key {
            return Ok(Some(value));
        }
    }
    Ok(None)
}
