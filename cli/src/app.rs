//! Application context: unified state passed to every command handler.
//!
//! Adding a new cross-cutting concern requires only one field change here;
//! command signatures stay the same.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::config::Inventory;
use crate::domain::host::HostConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlInventoryStore;
use crate::infra::fs::DiskFs;
use crate::infra::prompt::TerminalPrompter;
use crate::infra::ssh::{SshRemote, SshTarget};
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `NIGHTWATCH_DEPLOY_YES`).
    pub yes: bool,
    /// Inventory path given with `--config`.
    pub config: Option<PathBuf>,
    /// Host aliases given with `--host`; empty selects every host.
    pub hosts: Vec<String>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// When `true`, skip interactive prompts and use defaults.
    pub non_interactive: bool,
    /// Directory templates are read from and artifacts written to.
    pub workdir: PathBuf,
    config: Option<PathBuf>,
    hosts: Vec<String>,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(flags: AppFlags) -> Result<Self> {
        let ci_env = std::env::var("CI").is_ok();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode keeps stdout for the result document only.
        let quiet = flags.output.quiet || flags.output.json;

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, quiet),
            mode,
            non_interactive,
            workdir: std::env::current_dir().context("cannot determine working directory")?,
            config: flags.behaviour.config,
            hosts: flags.behaviour.hosts,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    #[must_use]
    pub fn prompter(&self) -> TerminalPrompter {
        TerminalPrompter::new(self.non_interactive)
    }

    #[must_use]
    pub fn fs(&self) -> DiskFs {
        DiskFs
    }

    /// Inventory store located from `--config` or the environment.
    #[must_use]
    pub fn inventory_store(&self) -> YamlInventoryStore {
        YamlInventoryStore::locate(self.config.as_deref())
    }

    /// Load the inventory and resolve the selected hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the inventory cannot be read or a selected host
    /// is unknown or incomplete.
    pub fn load_hosts(&self) -> Result<(Inventory, Vec<HostConfig>)> {
        let store = self.inventory_store();
        let inventory = store.load()?;
        let hosts = inventory.resolve_hosts(&self.hosts, store.path())?;
        tracing::debug!(
            inventory = %store.path().display(),
            hosts = hosts.len(),
            "inventory loaded"
        );
        Ok((inventory, hosts))
    }

    /// SSH executor for `host`.
    #[must_use]
    pub fn remote(&self, host: &HostConfig, inventory: &Inventory) -> SshRemote<TokioCommandRunner> {
        SshRemote::new(
            SshTarget::from_host(host),
            TokioCommandRunner::new(Duration::from_secs(inventory.ssh.timeout_secs)),
        )
    }
}
