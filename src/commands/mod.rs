//! Subcommand implementations.

pub mod converge;
pub mod status;

use anyhow::{Result, anyhow};
use pcskit::Client;
use std::io::ErrorKind;

use crate::Context;
use crate::config::{self, Manifest};

/// Load the manifest named on the command line, or the default one.
///
/// With `required` unset a missing default manifest yields an empty one.
pub fn load_manifest(ctx: &Context, required: bool) -> Result<Manifest> {
    let path = config::manifest_path(ctx.manifest.as_deref())?;
    let explicit = ctx.manifest.is_some();

    if !required && !explicit && !path.exists() {
        log::debug!("no manifest at {}, using defaults", path.display());
        return Ok(Manifest::default());
    }

    if required
        && let Err(e) = std::fs::metadata(&path)
        && e.kind() == ErrorKind::NotFound
    {
        return Err(anyhow!(
            "No manifest at {}\n  Create one or pass --manifest <path>",
            path.display()
        ));
    }

    Manifest::load(&path)
}

/// Client for the configured pcs binary.
pub fn client(ctx: &Context, manifest: &Manifest) -> Client {
    let pcs = ctx
        .pcs
        .clone()
        .or_else(|| manifest.pcs.clone())
        .unwrap_or_else(|| "pcs".to_string());
    log::debug!("using pcs binary {pcs}");
    Client::pcs(pcs).with_options(manifest.arg_options())
}

/// Shadow CIB for this run: `--cib` wins over the manifest.
pub fn shadow(ctx: &Context, manifest: &Manifest) -> Option<String> {
    ctx.cib.clone().or_else(|| manifest.cib.clone())
}

/// Attach the category advice to a library error.
pub fn explain(err: pcskit::Error) -> anyhow::Error {
    let advice = err.category().advice();
    anyhow!("{err}\n  {advice}")
}
