//! Supervisor config templates and their typed binding table.
//!
//! Pure functions only: no I/O, no async.
//!
//! Templates contain `{{token}}` placeholders. Each token is resolved against
//! a [`BindingTable`]: the four synthetic keys first, then the host's own
//! values. Tokens without a binding are copied to the output unchanged.
//! Rendering is a single left-to-right pass, so substituted values are never
//! scanned for further tokens.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::domain::host::{HostConfig, KEY_BIN_PHP, KEY_CURRENT_PATH};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\{\{([^{}]+)\}\}").expect("valid regex")
});

/// Name of the template looked up in the working directory.
pub const TEMPLATE_FILE_NAME: &str = ".nightwatch";

// ── Policies ─────────────────────────────────────────────────────────────────

/// What to do when the template source file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTemplatePolicy {
    /// Fall back to the template embedded in the binary.
    #[default]
    Bundled,
    /// Stop the pipeline and report the missing path.
    Abort,
}

// ── Binding table ────────────────────────────────────────────────────────────

/// Tokens computed from the live host. They take priority over host values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyntheticKey {
    BinPhp,
    CurrentPath,
    Port,
    Hostname,
}

impl SyntheticKey {
    pub const ALL: [Self; 4] = [Self::BinPhp, Self::CurrentPath, Self::Port, Self::Hostname];

    /// Token name as written between the braces.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::BinPhp => KEY_BIN_PHP,
            Self::CurrentPath => KEY_CURRENT_PATH,
            Self::Port => "port",
            Self::Hostname => "hostname",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.token() == token)
    }
}

/// Resolved values for every token a template may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    synthetic: BTreeMap<SyntheticKey, String>,
    overrides: BTreeMap<String, String>,
}

impl BindingTable {
    /// Bindings for `host`: synthetic keys from the host's live values, then
    /// every own value of the host.
    #[must_use]
    pub fn for_host(host: &HostConfig) -> Self {
        let mut table = Self::default();
        table.bind(SyntheticKey::BinPhp, host.bin_php());
        table.bind(SyntheticKey::CurrentPath, host.current_path());
        table.bind(SyntheticKey::Port, host.nightwatch_port().to_string());
        table.bind(SyntheticKey::Hostname, host.sanitized_hostname());
        for (name, value) in host.own_values() {
            table.bind_override(name.clone(), value.to_string());
        }
        table
    }

    pub fn bind(&mut self, key: SyntheticKey, value: impl Into<String>) {
        self.synthetic.insert(key, value.into());
    }

    pub fn bind_override(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.overrides.insert(name.into(), value.into());
    }

    /// Resolve a token name. Synthetic bindings win over overrides.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        SyntheticKey::from_token(name)
            .and_then(|key| self.synthetic.get(&key))
            .or_else(|| self.overrides.get(name))
            .map(String::as_str)
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Substitute every bound `{{token}}` in `template`.
#[must_use]
pub fn render(template: &str, bindings: &BindingTable) -> String {
    TOKEN_RE
        .replace_all(template, |caps: &Captures<'_>| {
            bindings
                .resolve(&caps[1])
                .map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

/// Token names in `template` that have no binding, in first-seen order.
#[must_use]
pub fn unresolved_tokens(template: &str, bindings: &BindingTable) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in TOKEN_RE.captures_iter(template) {
        let name = &caps[1];
        if bindings.resolve(name).is_none() && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}
