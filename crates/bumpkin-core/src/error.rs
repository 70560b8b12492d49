//! Error types for bumpkin-core

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// The configuration has no `current_version` to bump from.
    #[error("configuration has no current_version")]
    MissingCurrentVersion,

    /// Reading or writing the configuration file failed.
    #[error("config file {path}: {source}")]
    Io {
        /// The configuration file involved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The rewrite pattern for the config file failed to compile.
    #[error(transparent)]
    Pattern(#[from] Box<regex::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
