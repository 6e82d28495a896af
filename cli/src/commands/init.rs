//! `nightwatch-deploy init`: write the bundled template into the project.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::ports::LocalFs;
use crate::domain::template::TEMPLATE_FILE_NAME;
use crate::infra::assets;
use crate::output::json;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing template
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    path: String,
    written: bool,
}

/// Create `.nightwatch` in the working directory unless it exists.
///
/// # Errors
///
/// Returns an error if the template cannot be written.
pub fn run(app: &AppContext, args: &InitArgs) -> Result<ExitCode> {
    let fs = app.fs();
    let path = app.workdir.join(TEMPLATE_FILE_NAME);
    let written = if fs.exists(&path) && !args.force {
        app.output
            .note(&format!("{} already exists, leaving it unchanged", path.display()));
        false
    } else {
        fs.write(&path, assets::bundled_template()?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        app.output.success(&format!("Created {}", path.display()));
        true
    };

    if app.is_json() {
        json::print(&InitReport {
            path: path.display().to_string(),
            written,
        })?;
    }
    Ok(ExitCode::SUCCESS)
}
