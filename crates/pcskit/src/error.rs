//! Error types for cluster reconciliation.
//!
//! Errors coming back from `pcs` are categorized so callers can give
//! useful feedback. Categorization never changes control flow inside
//! this crate: a failed command is surfaced as-is and never retried.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of `pcs` failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The cluster stack is down or the CIB cannot be reached
    ClusterUnavailable,
    /// The named resource does not exist
    NotFound,
    /// A resource with that id already exists
    AlreadyExists,
    /// pcs rejected the arguments (unknown agent, bad option, ...)
    Invalid,
    /// Permission denied (pcs usually needs root or haclient)
    Permission,
    /// The pcs binary could not be executed
    PcsNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClusterUnavailable => "Cluster unavailable",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::Invalid => "Invalid resource definition",
            Self::Permission => "Permission denied",
            Self::PcsNotFound => "pcs not available",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::ClusterUnavailable => "Check that pacemaker and corosync are running on this node",
            Self::NotFound => "Re-read the cluster state; the resource may have been removed",
            Self::AlreadyExists => "Another resource already uses this id; pick a unique name",
            Self::Invalid => "Check the resource class, provider, type and parameters",
            Self::Permission => "Run as root or as a member of the haclient group",
            Self::PcsNotFound => "Install pcs or point --pcs at the binary",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while reading cluster state or planning changes.
#[derive(Debug, Error)]
pub enum Error {
    /// The snapshot is not well-formed XML
    #[error("invalid CIB XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The snapshot is XML but a primitive is missing required data
    #[error("invalid CIB snapshot: {message}")]
    SnapshotParse {
        /// What was missing or malformed
        message: String,
    },

    /// The same primitive was declared more than once
    #[error("primitive declared more than once: {name}")]
    DuplicateName {
        /// The repeated name
        name: String,
    },

    /// A declaration cannot be turned into a resource
    #[error("invalid declaration for {name}: {message}")]
    InvalidDeclaration {
        /// Primitive name
        name: String,
        /// What is wrong with it
        message: String,
    },

    /// The cluster stack is down or the CIB cannot be reached
    #[error("cluster unavailable: {message}")]
    ClusterUnavailable {
        /// Message reported by pcs
        message: String,
    },

    /// Resource not found
    #[error("resource not found: {name}")]
    NotFound {
        /// Name of the resource pcs could not find
        name: String,
    },

    /// Resource already exists
    #[error("resource already exists: {name}")]
    AlreadyExists {
        /// Name of the conflicting resource
        name: String,
    },

    /// pcs rejected the request as invalid
    #[error("rejected by pcs: {message}")]
    Invalid {
        /// Message reported by pcs
        message: String,
    },

    /// Permission denied
    #[error("permission denied: {message}")]
    Permission {
        /// Details about what permission was denied
        message: String,
    },

    /// The pcs binary could not be executed
    #[error("pcs not found at {}", path.display())]
    PcsNotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// Command execution failed
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ClusterUnavailable { .. } => ErrorCategory::ClusterUnavailable,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } | Error::DuplicateName { .. } => {
                ErrorCategory::AlreadyExists
            }
            Error::Invalid { .. } | Error::InvalidDeclaration { .. } => ErrorCategory::Invalid,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::PcsNotFound { .. } => ErrorCategory::PcsNotFound,
            _ => ErrorCategory::Other,
        }
    }

    /// Create an error from pcs command output.
    ///
    /// Analyzes stderr to categorize the error appropriately.
    pub fn from_pcs_output(stderr: &str, resource: Option<&str>) -> Self {
        let stderr_lower = stderr.to_lowercase();

        if stderr_lower.contains("unable to get cib")
            || stderr_lower.contains("unable to connect")
            || stderr_lower.contains("connection refused")
            || stderr_lower.contains("transport endpoint is not connected")
            || stderr_lower.contains("cluster is not currently running")
        {
            return Error::ClusterUnavailable {
                message: stderr.trim().to_string(),
            };
        }

        if stderr_lower.contains("does not exist")
            || stderr_lower.contains("unable to find resource")
        {
            return Error::NotFound {
                name: resource.unwrap_or("unknown").to_string(),
            };
        }

        if stderr_lower.contains("already exists") || stderr_lower.contains("is already in use") {
            return Error::AlreadyExists {
                name: resource.unwrap_or("unknown").to_string(),
            };
        }

        if stderr_lower.contains("permission denied")
            || stderr_lower.contains("must be root")
            || stderr_lower.contains("access denied")
        {
            return Error::Permission {
                message: stderr.trim().to_string(),
            };
        }

        if stderr_lower.contains("is not a valid")
            || stderr_lower.contains("invalid")
            || stderr_lower.contains("unable to find agent")
            || stderr_lower.contains("usage:")
        {
            return Error::Invalid {
                message: stderr.trim().to_string(),
            };
        }

        Error::CommandFailed {
            message: format!(
                "pcs command failed{}",
                resource.map(|n| format!(" for {n}")).unwrap_or_default()
            ),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Result type for cluster operations.
pub type Result<T> = std::result::Result<T, Error>;
