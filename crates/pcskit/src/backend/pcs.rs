//! Real `pcs` CLI backend.

use crate::backend::Backend;
use crate::error::{Error, Result};
use declarative::CommandOutput;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

/// Environment variable `pcs` reads to select a shadow CIB.
pub const SHADOW_ENV: &str = "CIB_shadow";

/// Backend that executes real `pcs` commands.
#[derive(Debug, Clone)]
pub struct PcsBackend {
    /// Path to the pcs executable
    pcs_path: PathBuf,
}

impl PcsBackend {
    /// Create a backend for the given `pcs` binary.
    pub fn new(pcs_path: impl Into<PathBuf>) -> Self {
        Self {
            pcs_path: pcs_path.into(),
        }
    }

    fn command(&self, args: &[String], cib: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.pcs_path);
        cmd.args(args);
        // Only the child sees the shadow; our own environment is untouched.
        match cib {
            Some(shadow) => cmd.env(SHADOW_ENV, shadow),
            None => cmd.env_remove(SHADOW_ENV),
        };
        cmd
    }
}

impl Backend for PcsBackend {
    fn execute(&self, args: &[String], cib: Option<&str>) -> Result<CommandOutput> {
        log::debug!(
            "running {} {}{}",
            self.pcs_path.display(),
            args.join(" "),
            cib.map(|c| format!(" ({SHADOW_ENV}={c})")).unwrap_or_default()
        );

        let output = self
            .command(args, cib)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::PcsNotFound {
                    path: self.pcs_path.clone(),
                },
                _ => Error::CommandFailed {
                    message: format!("failed to execute {}: {e}", self.pcs_path.display()),
                    stderr: String::new(),
                },
            })?;

        let output = CommandOutput::from(output);
        if !output.success {
            log::debug!("pcs exited unsuccessfully: {}", output.failure_message());
        }
        Ok(output)
    }
}
