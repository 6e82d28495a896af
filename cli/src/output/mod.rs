//! Terminal output for the deploy CLI.
//!
//! Per-host results go to stdout. Warnings and errors go to stderr, whether
//! they come from a command or from a service through
//! [`reporter::TerminalReporter`], so both share one prefix and one stream.

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Where and how the CLI prints.
pub struct OutputContext {
    pub styles: Styles,
    /// Spinners are drawn on stderr, so they need it to be a terminal.
    progress: bool,
    /// Suppress everything on stdout except JSON documents.
    pub quiet: bool,
}

impl OutputContext {
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let use_colors = !no_color && Term::stdout().is_term() && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self {
            styles,
            progress: Term::stderr().is_term() && !quiet,
            quiet,
        }
    }

    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.progress
    }

    /// Section line opening the output for one host alias.
    pub fn host(&self, alias: &str) {
        if !self.quiet {
            println!("{}", alias.style(self.styles.host));
        }
    }

    pub fn step(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "→".style(self.styles.step));
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// A neutral result, such as a declined replacement or a kept file.
    pub fn note(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "·".style(self.styles.note));
        }
    }

    /// Printed to stderr even when `quiet`.
    pub fn warn(&self, msg: &str) {
        eprintln!("  {} {msg}", "!".style(self.styles.warning));
    }

    /// Printed to stderr even when `quiet`.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// One `key value` line with the key padded and dimmed.
    pub fn field(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<26}{value}", key.style(self.styles.note));
        }
    }
}
