// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecError;

#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("no device given and the fleet is empty")]
    DeviceRequired,

    #[error("envsetup missing in {}: {source}", dir.display())]
    EnvsetupMissing {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preflight failed ({failed} checks)")]
    Preflight { failed: usize },

    #[error(transparent)]
    Exec(#[from] ExecError),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
