//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

// ── Remote Execution Port ─────────────────────────────────────────────────────

/// Shell access to one target host.
///
/// Commands are POSIX shell fragments evaluated by the remote login shell.
#[allow(async_fn_in_trait)]
pub trait RemoteExecutor {
    /// Run `command` and return its stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the command exits non-zero or the transport fails.
    async fn run(&self, command: &str) -> Result<String>;

    /// Evaluate `command` as a condition: `true` on exit status 0.
    ///
    /// # Errors
    ///
    /// Returns an error only when the transport fails, never for a false
    /// condition.
    async fn test(&self, command: &str) -> Result<bool>;

    /// Copy a local file to `remote` on the host.
    async fn upload(&self, local: &Path, remote: &str) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Interaction Port ──────────────────────────────────────────────────────────

/// Interactive questions asked during provisioning.
pub trait Prompter {
    /// Ask a yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Ask for a line of text. Returns an empty string when no answer can be
    /// collected (non-interactive mode).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    fn input(&self, prompt: &str) -> Result<String>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Abstracts local file access for templates and compiled artifacts.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Write `content` to `path`, surfacing the raw I/O error.
    fn write(&self, path: &Path, content: &str) -> std::io::Result<()>;
    /// Remove `path`; a missing file is not an error.
    fn remove_file(&self, path: &Path) -> Result<()>;
}
