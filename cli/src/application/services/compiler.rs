//! Template compilation into the transient per-host artifact.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::{LocalFs, ProgressReporter};
use crate::domain::error::ProvisionError;
use crate::domain::host::HostConfig;
use crate::domain::template::{self, BindingTable, MissingTemplatePolicy};

/// Where the template comes from and what to do if it is missing.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSource<'a> {
    pub path: &'a Path,
    pub policy: MissingTemplatePolicy,
    /// Template embedded in the binary, used under [`MissingTemplatePolicy::Bundled`].
    pub bundled: &'a str,
}

/// A rendered config written to the local working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub path: PathBuf,
    pub contents: String,
    /// Tokens left in `contents` because nothing bound them.
    pub unresolved: Vec<String>,
}

/// Local path of the compiled artifact for `host`.
#[must_use]
pub fn artifact_path(workdir: &Path, host: &HostConfig) -> PathBuf {
    workdir.join(format!(".nightwatch-{}", host.config_file_name()))
}

fn load_template(fs: &impl LocalFs, source: &TemplateSource<'_>) -> Result<String> {
    if fs.exists(source.path) {
        return fs.read_to_string(source.path);
    }
    match source.policy {
        MissingTemplatePolicy::Bundled => {
            tracing::debug!(path = %source.path.display(), "template missing, using bundled default");
            Ok(source.bundled.to_string())
        }
        MissingTemplatePolicy::Abort => Err(ProvisionError::TemplateNotFound {
            path: source.path.to_path_buf(),
        }
        .into()),
    }
}

/// Render the template for `host` and write it to `artifact_path(workdir, host)`.
///
/// # Errors
///
/// - [`ProvisionError::TemplateNotFound`] when the source is missing under
///   [`MissingTemplatePolicy::Abort`].
/// - [`ProvisionError::ArtifactWriteFailed`] when the artifact cannot be
///   written.
/// - Any read error of an existing template.
pub fn compile(
    fs: &impl LocalFs,
    source: &TemplateSource<'_>,
    host: &HostConfig,
    workdir: &Path,
    reporter: &impl ProgressReporter,
) -> Result<CompiledArtifact> {
    let raw = load_template(fs, source)?;
    let bindings = BindingTable::for_host(host);
    let contents = template::render(&raw, &bindings);
    let unresolved = template::unresolved_tokens(&raw, &bindings);
    if !unresolved.is_empty() {
        reporter.warn(&format!(
            "Template tokens left unresolved: {}",
            unresolved
                .iter()
                .map(|t| format!("{{{{{t}}}}}"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let path = artifact_path(workdir, host);
    fs.write(&path, &contents)
        .map_err(|source| ProvisionError::ArtifactWriteFailed {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "compiled artifact written");

    Ok(CompiledArtifact {
        path,
        contents,
        unresolved,
    })
}
