//! Terminal implementation of the `Prompter` port using dialoguer.

use anyhow::Result;

use crate::application::ports::Prompter;

/// Asks questions on the controlling terminal.
///
/// When `non_interactive` is `true` (CI, `--yes` flag, or
/// `NIGHTWATCH_DEPLOY_YES` env), confirmations return their default and text
/// input returns an empty string without prompting.
pub struct TerminalPrompter {
    non_interactive: bool,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            tracing::debug!(prompt, default, "non-interactive confirm");
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    fn input(&self, prompt: &str) -> Result<String> {
        if self.non_interactive {
            return Ok(String::new());
        }
        let answer: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer)
    }
}
