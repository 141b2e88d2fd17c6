// src/artifacts.rs

//! Release metadata written by `arkforge release`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{Config, FleetDevice};
use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub commander: String,
    pub version: String,
    pub devices: Vec<FleetDevice>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

impl Manifest {
    pub fn generate(cfg: &Config) -> Self {
        Self::generate_at(cfg, Utc::now())
    }

    pub fn generate_at(cfg: &Config, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            commander: cfg.commander.clone(),
            version: cfg.version.clone(),
            devices: cfg.fleet.clone(),
            notes: BTreeMap::new(),
        }
    }
}

pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("artifacts/manifest.yaml")
}

/// Serialise `manifest` as YAML to `path`, creating parent directories.
pub fn write_manifest(path: impl AsRef<Path>, manifest: &Manifest) -> Result<PathBuf> {
    let path = match path.as_ref() {
        p if p.as_os_str().is_empty() => default_manifest_path(),
        p => p.to_path_buf(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let data = serde_yaml::to_string(manifest)?;
    fs::write(&path, data)?;
    info!(path = %path.display(), devices = manifest.devices.len(), "release manifest written");
    Ok(path)
}
