use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration and secrets for the CLI.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not locate home directory")]
    HomeDirNotFound,

    #[error("Failed to read settings file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Section [{0}] not found in settings")]
    SectionNotFound(String),

    #[error("Incomplete secrets in section [{section}]: missing {missing}")]
    IncompleteSecrets {
        section: String,
        missing: &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid filter '{0}' (expected format: key=value)")]
    InvalidEntry(String),

    #[error("Filter key '{key}' given more than once ('{first}', '{second}')")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
}
