//! The Nightwatch block written into the application's shared `.env`.
//!
//! Pure functions only: the commands built here are executed by the
//! enrollment service through the remote executor port.

use crate::domain::shell::quote;

pub const DEFAULT_SAMPLE_RATE: &str = "0.1";

/// Keys owned by the Nightwatch block. Existing lines for these keys are
/// removed before the block is appended.
pub const NIGHTWATCH_ENV_KEYS: [&str; 3] = [
    "NIGHTWATCH_TOKEN",
    "NIGHTWATCH_REQUEST_SAMPLE_RATE",
    "NIGHTWATCH_INGEST_URI",
];

/// Settings the agent reads from the application environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightwatchEnv {
    pub token: String,
    pub sample_rate: String,
    pub port: u16,
}

impl NightwatchEnv {
    #[must_use]
    pub fn ingest_uri(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// `KEY=value` lines in file order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("{}={}", NIGHTWATCH_ENV_KEYS[0], self.token),
            format!("{}={}", NIGHTWATCH_ENV_KEYS[1], self.sample_rate),
            format!("{}={}", NIGHTWATCH_ENV_KEYS[2], self.ingest_uri()),
        ]
    }

    /// Same as [`lines`](Self::lines) with the token masked for display.
    #[must_use]
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = self.lines();
        lines[0] = format!("{}={}", NIGHTWATCH_ENV_KEYS[0], mask_token(&self.token));
        lines
    }

    /// Commands that back up `env_path`, drop stale Nightwatch keys and
    /// append the new block, in execution order.
    #[must_use]
    pub fn patch_commands(&self, env_path: &str) -> Vec<String> {
        let path = quote(env_path);
        let backup = quote(&format!("{env_path}.backup"));
        let mut commands = vec![format!("cp {path} {backup}")];
        for key in NIGHTWATCH_ENV_KEYS {
            commands.push(format!("sed -i '/^{key}=/d' {path}"));
        }
        let mut block = vec![String::new(), "# Nightwatch Configuration".to_string()];
        block.extend(self.lines());
        let args: Vec<String> = block.iter().map(|line| quote(line)).collect();
        commands.push(format!("printf '%s\\n' {} >> {path}", args.join(" ")));
        commands
    }
}

/// Show only the last four characters of a token.
#[must_use]
pub fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}
