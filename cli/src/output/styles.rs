//! Colors for the prefixes the CLI prints.

use owo_colors::Style;

/// Stylesheet shared by [`super::OutputContext`] and the progress reporter.
/// Plain by default; [`Styles::colorize`] turns colors on.
#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub step: Style,
    /// Neutral results and field keys.
    pub note: Style,
    pub host: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.step = Style::new().cyan();
        self.note = Style::new().dimmed();
        self.host = Style::new().bold().cyan();
    }
}
