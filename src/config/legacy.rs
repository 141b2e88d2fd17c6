// src/config/legacy.rs

//! Reader for the shell-era `config/ark-settings.conf`.
//!
//! The file is a list of `KEY="value"` assignments with `#` comments. Only a
//! handful of keys map onto the modern model; everything else is ignored.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::model::Config;
use crate::errors::Result;

/// Location of the legacy settings file, relative to the working directory.
pub const LEGACY_CONFIG_PATH: &str = "config/ark-settings.conf";

pub fn load_legacy(path: impl AsRef<Path>) -> Result<Config> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(from_pairs(&parse_pairs(&contents)))
}

/// Parse `KEY=value` lines, skipping blanks, comments and malformed lines.
pub fn parse_pairs(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let key = key.trim_matches(|c| c == '"' || c == ' ');
            let value = value.trim_matches(|c| c == '"' || c == ' ');
            (key.to_string(), value.to_string())
        })
        .collect()
}

fn from_pairs(kv: &HashMap<String, String>) -> Config {
    let mut cfg = Config::default();

    if let Some(commander) = kv.get("ARK_COMMANDER") {
        cfg.commander = commander.clone();
    }
    if let Some(primary) = cfg.fleet.first_mut() {
        if let Some(codename) = kv.get("ARK_PRIMARY_DEVICE") {
            primary.codename = codename.clone();
        }
        if let Some(name) = kv.get("ARK_PRIMARY_DEVICE_NAME") {
            primary.name = name.clone();
        }
    }
    if let Some(default_type) = kv.get("ARK_DEFAULT_BUILD_TYPE") {
        cfg.build.default_type = default_type.clone();
    }
    if let Some(jobs) = kv
        .get("ARK_DEFAULT_JOBS")
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|j| *j > 0)
    {
        cfg.jobs = jobs;
    }

    cfg
}
