//! Embedded assets: the default agent template compiled into the binary.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `.nightwatch`: supervisor program template used when a project has
//!     none of its own, and written out by `init`.

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::domain::template::TEMPLATE_FILE_NAME;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Return the raw bytes of a single embedded asset.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    EMBEDDED_ASSETS
        .get_file(name)
        .map(|f| f.contents())
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// The bundled `.nightwatch` template as text.
///
/// # Errors
///
/// Returns an error if the asset is missing or not UTF-8.
pub fn bundled_template() -> Result<&'static str> {
    let bytes = get_asset(TEMPLATE_FILE_NAME)?;
    std::str::from_utf8(bytes).context("bundled template is not valid UTF-8")
}
