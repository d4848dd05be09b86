//! Backend abstraction for running `pcs`.
//!
//! The [`Backend`] trait is the single place external commands are run,
//! so tests can swap in a recording implementation.

#[cfg(any(test, feature = "test-support"))]
pub mod recording;
pub mod pcs;

use crate::error::Result;
use declarative::CommandOutput;

/// Backend trait for cluster commands.
///
/// One call is one attempt: no retry, no timeout. A non-zero exit status
/// is returned in [`CommandOutput`], not as an error; only failing to run
/// the command at all is an `Err`.
pub trait Backend {
    /// Run `pcs` with `args`, optionally against the named shadow CIB.
    fn execute(&self, args: &[String], cib: Option<&str>) -> Result<CommandOutput>;
}
