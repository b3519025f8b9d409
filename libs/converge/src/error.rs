//! Error types for parameter resolution and instance planning.

use thiserror::Error;

/// Errors that can occur when validating an instance name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The name is empty.
    #[error("instance name cannot be empty")]
    Empty,

    /// The name exceeds the maximum length.
    #[error("instance name too long: {actual} bytes (max {max})")]
    TooLong { max: usize, actual: usize },

    /// The name contains a character outside the allowed set.
    #[error("invalid character '{ch}' in instance name")]
    InvalidChar { ch: char },

    /// The name is a reserved path token or has no alphanumeric content.
    #[error("reserved or degenerate instance name: '{0}'")]
    Reserved(String),
}

/// Errors raised at plan time.
///
/// All planning errors surface before any intent is emitted: a plan either
/// completes in full or produces nothing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A parameter required for the requested target state is missing.
    #[error("instance '{instance}': missing required parameter '{parameter}'")]
    MissingRequiredParameter {
        instance: String,
        parameter: &'static str,
    },

    /// The same instance name was declared twice in one convergence run.
    #[error("duplicate instance name: '{0}'")]
    DuplicateInstanceName(String),

    /// The target state token is not one of present, absent, deleted.
    #[error("invalid target state: '{0}' (expected present, absent, or deleted)")]
    InvalidTargetState(String),

    /// The instance name failed token validation.
    #[error("invalid instance name: {0}")]
    Name(#[from] NameError),

    /// The site manifest could not be parsed.
    #[error("invalid site manifest: {0}")]
    Manifest(String),

    /// The site manifest could not be read.
    #[error("failed to read site manifest: {0}")]
    Io(#[from] std::io::Error),
}
