// src/errors.rs

//! Crate-wide error type and aliases.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KabedonError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Launching a child failed. Recoverable: only that service is skipped.
    #[error("unable to start {service}: {source}")]
    StartError {
        service: String,
        #[source]
        source: std::io::Error,
    },

    /// Terminating a child failed during shutdown. Fatal to the process.
    #[error("unable to kill {service}: {source}")]
    KillError {
        service: String,
        #[source]
        source: std::io::Error,
    },

    /// A collaborator server could not listen on its port. Fatal.
    #[error("{server} server unable to bind port {port}: {source}")]
    BindError {
        server: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, KabedonError>;
