//! CIB snapshot parsing.
//!
//! This module turns the XML printed by `pcs cluster cib` into observed
//! [`Primitive`](crate::Primitive) records.

pub mod parser;

pub use parser::{classify, parse_snapshot, parse_snapshot_file};
