// src/config/model.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration as read from `forge.yaml`.
///
/// ```yaml
/// version: 1.1.4
/// commander: koobie777
/// mode: expert
/// jobs: 8
/// build:
///   workspace: ./builds
///   defaultType: recovery
/// fleet:
///   - name: OnePlus 12
///     codename: waffle
///     role: primary
///     repository: lineageos
/// ```
///
/// Every key is optional; missing keys take the values from
/// [`Config::default`]. Turned into a [`Config`] by `validate.rs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub version: String,
    pub commander: String,
    pub mode: String,
    /// Signed so that `0` and negative values can be normalised rather than
    /// rejected by the YAML decoder.
    pub jobs: i64,
    pub build: BuildConfig,
    pub theme: ThemeConfig,
    pub fleet: Vec<FleetDevice>,
}

impl Default for RawConfig {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            version: cfg.version,
            commander: cfg.commander,
            mode: cfg.mode,
            jobs: i64::from(cfg.jobs),
            build: cfg.build,
            theme: cfg.theme,
            fleet: cfg.fleet,
        }
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Where this config was loaded from (or will be persisted to).
    #[serde(skip)]
    pub file: Option<PathBuf>,
    pub version: String,
    pub commander: String,
    pub mode: String,
    pub jobs: u32,
    pub build: BuildConfig,
    pub theme: ThemeConfig,
    pub fleet: Vec<FleetDevice>,
}

/// `build:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub workspace: String,
    #[serde(rename = "defaultType")]
    pub default_type: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            workspace: "./builds".to_string(),
            default_type: "recovery".to_string(),
        }
    }
}

/// `theme:` section; only consumed by the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub enabled: bool,
    pub accent: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            accent: "cyan".to_string(),
        }
    }
}

/// A buildable device in the fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetDevice {
    pub name: String,
    pub codename: String,
    pub role: String,
    pub repository: String,
}

impl FleetDevice {
    pub fn new(name: &str, codename: &str, role: &str, repository: &str) -> Self {
        Self {
            name: name.to_string(),
            codename: codename.to_string(),
            role: role.to_string(),
            repository: repository.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            version: "1.1.4".to_string(),
            commander: "koobie777".to_string(),
            mode: "expert".to_string(),
            jobs: 8,
            build: BuildConfig::default(),
            theme: ThemeConfig::default(),
            fleet: vec![
                FleetDevice::new("OnePlus 12", "waffle", "primary", "lineageos"),
                FleetDevice::new("OnePlus 10 Pro", "op515dl1", "secondary", "evolution"),
            ],
        }
    }
}

impl Config {
    /// Fleet device with the given codename, compared case-insensitively.
    pub fn device_by_codename(&self, codename: &str) -> Option<&FleetDevice> {
        self.fleet
            .iter()
            .find(|d| d.codename.eq_ignore_ascii_case(codename))
    }

    /// Codename of the first fleet entry, used when no device is named.
    pub fn primary_codename(&self) -> Option<&str> {
        self.fleet.first().map(|d| d.codename.as_str())
    }
}
