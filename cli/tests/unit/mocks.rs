//! Shared test doubles: a simulated deployment host plus prompt and
//! progress stand-ins.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Result;
use nightwatch_deploy::application::ports::{ProgressReporter, Prompter, RemoteExecutor};
use nightwatch_deploy::domain::host::{
    ConfigValue, DEFAULT_SUPERVISOR_DEPLOY_SCRIPT, HostConfig, KEY_DEPLOY_PATH, KEY_HOSTNAME,
    SUPERVISOR_CONF_DIR,
};
use nightwatch_deploy::domain::supervisor::STATUS_UNAVAILABLE_MARKER;

/// A target host simulated in memory.
///
/// Answers the probes the pipeline issues (`pgrep`, `[ -f ]`, `[ -x ]`,
/// `[ -d ]`, the port probe) from its fields, stores uploads by remote
/// path, and emulates the supervisor helper script.
pub struct FakeHost {
    pub supervisord: bool,
    pub files: RefCell<BTreeSet<String>>,
    pub executables: BTreeSet<String>,
    pub dirs: BTreeSet<String>,
    pub ports_in_use: BTreeSet<u16>,
    pub helper_fails: bool,
    pub uploads: RefCell<BTreeMap<String, String>>,
    pub units: RefCell<BTreeSet<String>>,
    pub runs: RefCell<Vec<String>>,
}

impl FakeHost {
    /// A host with supervisord running and the helper script installed.
    pub fn ready() -> Self {
        let script = DEFAULT_SUPERVISOR_DEPLOY_SCRIPT.to_string();
        Self {
            supervisord: true,
            files: RefCell::new(BTreeSet::from([script.clone()])),
            executables: BTreeSet::from([script]),
            dirs: BTreeSet::from([SUPERVISOR_CONF_DIR.to_string()]),
            ports_in_use: BTreeSet::new(),
            helper_fails: false,
            uploads: RefCell::new(BTreeMap::new()),
            units: RefCell::new(BTreeSet::new()),
            runs: RefCell::new(Vec::new()),
        }
    }

    pub fn with_ports_in_use(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports_in_use.extend(ports);
        self
    }

    pub fn with_file(self, path: &str) -> Self {
        self.files.borrow_mut().insert(path.to_string());
        self
    }

    pub fn upload_content(&self, remote: &str) -> Option<String> {
        self.uploads.borrow().get(remote).cloned()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.runs.borrow().iter().any(|r| r.contains(needle))
    }

    fn probed_port(command: &str) -> Option<u16> {
        let start = command.find("':")? + 2;
        let rest = &command[start..];
        rest[..rest.find(' ')?].parse().ok()
    }

    fn bracket_arg<'a>(command: &'a str, flag: &str) -> Option<&'a str> {
        command
            .strip_prefix(&format!("[ {flag} "))?
            .strip_suffix(" ]")
    }

    fn register(&self, command: &str) -> Result<String> {
        if self.helper_fails {
            anyhow::bail!("deploy-supervisor-config: invalid configuration");
        }
        let args: Vec<&str> = command.split_whitespace().collect();
        let (Some(path), Some(unit)) = (args.get(2), args.get(3)) else {
            anyhow::bail!("helper called with wrong arguments: {command}");
        };
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files
            .borrow_mut()
            .insert(format!("{SUPERVISOR_CONF_DIR}/{name}"));
        self.units.borrow_mut().insert((*unit).to_string());
        Ok(String::new())
    }
}

impl RemoteExecutor for FakeHost {
    async fn run(&self, command: &str) -> Result<String> {
        self.runs.borrow_mut().push(command.to_string());
        if let Some(rest) = command.strip_prefix("sudo supervisorctl status ") {
            let unit = rest.split_whitespace().next().unwrap_or_default();
            return Ok(if self.units.borrow().contains(unit) {
                format!("{unit}                 RUNNING   pid 4242, uptime 0:00:02\n")
            } else {
                format!("{STATUS_UNAVAILABLE_MARKER}\n")
            });
        }
        if command.starts_with(&format!("sudo {DEFAULT_SUPERVISOR_DEPLOY_SCRIPT} ")) {
            return self.register(command);
        }
        if let Some(path) = command.strip_prefix("rm -f ") {
            self.uploads.borrow_mut().remove(path);
        }
        Ok(String::new())
    }

    async fn test(&self, command: &str) -> Result<bool> {
        if command.starts_with("pgrep supervisord") {
            return Ok(self.supervisord);
        }
        if let Some(port) = Self::probed_port(command) {
            return Ok(self.ports_in_use.contains(&port));
        }
        if let Some(path) = Self::bracket_arg(command, "-f") {
            return Ok(self.files.borrow().contains(path));
        }
        if let Some(path) = Self::bracket_arg(command, "-x") {
            return Ok(self.executables.contains(path));
        }
        if let Some(path) = Self::bracket_arg(command, "-d") {
            return Ok(self.dirs.contains(path));
        }
        anyhow::bail!("unexpected test command: {command}")
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let content = std::fs::read_to_string(local)?;
        self.uploads.borrow_mut().insert(remote.to_string(), content);
        Ok(())
    }
}

/// Fixed prompt answers; records every question.
pub struct Answers {
    pub confirm: bool,
    pub token: String,
    pub asked: RefCell<Vec<String>>,
}

impl Answers {
    pub fn new(confirm: bool, token: &str) -> Self {
        Self {
            confirm,
            token: token.to_string(),
            asked: RefCell::new(Vec::new()),
        }
    }
}

impl Prompter for Answers {
    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.confirm)
    }

    fn input(&self, prompt: &str) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.token.clone())
    }
}

/// Reporter that keeps warnings and drops everything else.
#[derive(Default)]
pub struct Warnings(pub RefCell<Vec<String>>);

impl ProgressReporter for Warnings {
    fn step(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn warn(&self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

/// Host `web01.example.com` deployed to `/var/www/app`.
pub fn web01() -> HostConfig {
    let own = BTreeMap::from([
        (KEY_HOSTNAME.to_string(), ConfigValue::from("web01.example.com")),
        (KEY_DEPLOY_PATH.to_string(), ConfigValue::from("/var/www/app")),
    ]);
    HostConfig::new("web01", own, BTreeMap::new())
}
