// src/config/validate.rs

use crate::config::model::{BuildConfig, Config, FleetDevice, RawConfig};
use crate::errors::{ForgeError, Result};

impl TryFrom<RawConfig> for Config {
    type Error = ForgeError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_fleet(&raw.fleet)?;
        Ok(normalise(raw))
    }
}

/// Public entry point for callers holding an already-built `Config`.
pub fn validate_config(cfg: &Config) -> Result<()> {
    if cfg.jobs == 0 {
        return Err(ForgeError::ConfigError("jobs must be >= 1 (got 0)".to_string()));
    }
    if cfg.build.workspace.trim().is_empty() {
        return Err(ForgeError::ConfigError(
            "build.workspace must not be empty".to_string(),
        ));
    }
    validate_fleet(&cfg.fleet)
}

fn validate_fleet(fleet: &[FleetDevice]) -> Result<()> {
    for (idx, device) in fleet.iter().enumerate() {
        if device.codename.trim().is_empty() {
            return Err(ForgeError::ConfigError(format!(
                "fleet[{idx}] ('{}') has no codename",
                device.name
            )));
        }
    }
    Ok(())
}

/// Replace unusable values with defaults instead of failing.
fn normalise(raw: RawConfig) -> Config {
    let defaults = Config::default();
    let default_build = BuildConfig::default();

    let jobs = u32::try_from(raw.jobs)
        .ok()
        .filter(|j| *j > 0)
        .unwrap_or(defaults.jobs);

    let workspace = if raw.build.workspace.trim().is_empty() {
        default_build.workspace
    } else {
        raw.build.workspace
    };
    let default_type = if raw.build.default_type.trim().is_empty() {
        default_build.default_type
    } else {
        raw.build.default_type
    };

    Config {
        file: None,
        version: raw.version,
        commander: raw.commander,
        mode: raw.mode,
        jobs,
        build: BuildConfig {
            workspace,
            default_type,
        },
        theme: raw.theme,
        fleet: raw.fleet,
    }
}
