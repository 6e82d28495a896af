//! `RemoteExecutor` over the system `ssh` and `scp` clients.
//!
//! Each call spawns one client process through a [`CommandRunner`]; there is
//! no connection reuse. `BatchMode=yes` makes a missing key fail fast
//! instead of prompting for a password.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RemoteExecutor};
use crate::domain::host::HostConfig;

/// Exit status `ssh` uses for its own failures.
const SSH_TRANSPORT_FAILURE: i32 = 255;

/// Connection parameters for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub hostname: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
}

impl SshTarget {
    #[must_use]
    pub fn from_host(host: &HostConfig) -> Self {
        Self {
            hostname: host.hostname(),
            user: host.remote_user(),
            port: host.ssh_port(),
            identity_file: host.identity_file(),
        }
    }

    /// `user@hostname`, or the bare hostname when no user is configured.
    #[must_use]
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.hostname),
            None => self.hostname.clone(),
        }
    }

    fn common_options(&self, port_flag: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "LogLevel=ERROR".to_string(),
        ];
        if let Some(port) = self.port {
            args.push(port_flag.to_string());
            args.push(port.to_string());
        }
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.clone());
        }
        args
    }

    /// Arguments for `ssh` running `command` on the target.
    #[must_use]
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.common_options("-p");
        args.push(self.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }

    /// Arguments for `scp` copying `local` to `remote` on the target.
    #[must_use]
    pub fn scp_args(&self, local: &Path, remote: &str) -> Vec<String> {
        let mut args = self.common_options("-P");
        args.push(local.to_string_lossy().into_owned());
        args.push(format!("{}:{remote}", self.destination()));
        args
    }
}

/// Remote executor for one host.
pub struct SshRemote<R: CommandRunner> {
    target: SshTarget,
    runner: R,
}

impl<R: CommandRunner> SshRemote<R> {
    #[must_use]
    pub fn new(target: SshTarget, runner: R) -> Self {
        Self { target, runner }
    }

    async fn ssh(&self, command: &str) -> Result<Output> {
        tracing::debug!(host = %self.target.hostname, %command, "ssh");
        let args = self.target.ssh_args(command);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run("ssh", &argv)
            .await
            .with_context(|| format!("ssh to {}", self.target.hostname))
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

impl<R: CommandRunner> RemoteExecutor for SshRemote<R> {
    async fn run(&self, command: &str) -> Result<String> {
        let output = self.ssh(command).await?;
        if !output.status.success() {
            anyhow::bail!(
                "command failed on {} ({}): {command}: {}",
                self.target.hostname,
                output.status,
                stderr_text(&output)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn test(&self, command: &str) -> Result<bool> {
        let output = self.ssh(command).await?;
        if output.status.code() == Some(SSH_TRANSPORT_FAILURE) {
            anyhow::bail!(
                "ssh connection to {} failed: {}",
                self.target.hostname,
                stderr_text(&output)
            );
        }
        Ok(output.status.success())
    }

    async fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        tracing::debug!(host = %self.target.hostname, local = %local.display(), %remote, "scp");
        let args = self.target.scp_args(local, remote);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run("scp", &argv)
            .await
            .with_context(|| format!("scp to {}", self.target.hostname))?;
        if !output.status.success() {
            anyhow::bail!(
                "upload of {} to {}:{remote} failed: {}",
                local.display(),
                self.target.hostname,
                stderr_text(&output)
            );
        }
        Ok(())
    }
}
