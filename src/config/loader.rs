// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::legacy::{LEGACY_CONFIG_PATH, load_legacy};
use crate::config::model::{Config, RawConfig};
use crate::config::validate::validate_config;
use crate::errors::{ForgeError, Result};

/// Read `forge.yaml` and return the raw `RawConfig`.
///
/// This only performs YAML deserialization; defaults for missing keys come
/// from `serde`, normalisation happens in [`Config::try_from`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    // An empty file decodes as YAML null; treat it as "all defaults".
    if contents.trim().is_empty() {
        return Ok(RawConfig::default());
    }
    let config: RawConfig = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// Load the configuration the rest of the application runs with.
///
/// - `path` exists: parse and validate it. Parse errors are fatal.
/// - `path` missing: fall back to the legacy settings file, then to
///   [`Config::default`], and persist the result to `path` so the next run
///   finds a modern file. A failed write is logged and ignored.
pub fn load(path: impl AsRef<Path>) -> Result<Config> {
    load_with_legacy(path, LEGACY_CONFIG_PATH)
}

pub fn load_with_legacy(path: impl AsRef<Path>, legacy_path: impl AsRef<Path>) -> Result<Config> {
    let path = match path.as_ref() {
        p if p.as_os_str().is_empty() => default_config_path(),
        p => p.to_path_buf(),
    };

    match load_from_path(&path) {
        Ok(raw) => {
            let mut cfg = Config::try_from(raw)?;
            cfg.file = Some(path);
            return Ok(cfg);
        }
        Err(ForgeError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found; trying legacy settings");
        }
        Err(e) => return Err(e),
    }

    let legacy_path = legacy_path.as_ref();
    let mut cfg = match load_legacy(legacy_path) {
        Ok(cfg) => {
            info!(path = %legacy_path.display(), "imported legacy settings");
            cfg
        }
        Err(e) => {
            debug!(path = %legacy_path.display(), error = %e, "no legacy settings; using defaults");
            Config::default()
        }
    };
    validate_config(&cfg)?;

    if let Err(e) = persist(&path, &cfg) {
        warn!(path = %path.display(), error = %e, "could not persist default config");
    }
    cfg.file = Some(path);
    Ok(cfg)
}

/// Write `cfg` as YAML, creating parent directories.
pub fn persist(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let data = serde_yaml::to_string(cfg)?;
    fs::write(path, data)?;
    Ok(())
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("forge.yaml")
}
