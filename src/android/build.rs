// src/android/build.rs

//! `envsetup` + `lunch` + `m` for one fleet device.

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::errors::{ForgeError, Result};
use crate::exec::{LogicalCommand, Outcome, Runner};

pub const DEFAULT_VARIANT: &str = "userdebug";
const FALLBACK_REPOSITORY: &str = "android";

/// How to launch a build. Empty fields fall back to configuration defaults.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub device: Option<String>,
    pub target: Option<String>,
    pub variant: Option<String>,
    pub repo_override: Option<String>,
    pub dry_run: bool,
    pub timeout: Option<Duration>,
}

/// A build request with every default resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub device: String,
    pub target: String,
    pub variant: String,
    pub source_dir: PathBuf,
}

impl BuildPlan {
    pub fn resolve(cfg: &Config, opts: &BuildOptions) -> Result<Self> {
        let device = match non_empty(&opts.device) {
            Some(device) => device.to_string(),
            None => cfg
                .primary_codename()
                .ok_or(ForgeError::DeviceRequired)?
                .to_string(),
        };
        let target = non_empty(&opts.target)
            .unwrap_or(cfg.build.default_type.as_str())
            .to_string();
        let variant = non_empty(&opts.variant)
            .unwrap_or(DEFAULT_VARIANT)
            .to_string();

        let repo = match non_empty(&opts.repo_override) {
            Some(repo) => repo,
            None => cfg
                .device_by_codename(&device)
                .map(|d| d.repository.as_str())
                .filter(|r| !r.is_empty())
                .unwrap_or(FALLBACK_REPOSITORY),
        };
        let source_dir = PathBuf::from(&cfg.build.workspace).join(format!("{repo}-{device}"));

        Ok(Self {
            device,
            target,
            variant,
            source_dir,
        })
    }

    pub fn script(&self, jobs: u32) -> String {
        format!(
            "set -euo pipefail; source build/envsetup.sh && lunch {}-{} && m {} -j{}",
            self.device, self.variant, self.target, jobs
        )
    }

    pub fn command(&self, cfg: &Config, opts: &BuildOptions) -> LogicalCommand {
        LogicalCommand::new("bash")
            .arg("-lc")
            .arg(self.script(cfg.jobs))
            .current_dir(&self.source_dir)
            .env("ARK_COMMANDER", &cfg.commander)
            .timeout(opts.timeout)
            .dry_run(opts.dry_run)
    }
}

/// Resolve the build, check the source tree, and hand the command to the
/// runner.
pub async fn build(
    runner: &Runner,
    cancel: &CancellationToken,
    cfg: &Config,
    opts: &BuildOptions,
) -> Result<Outcome> {
    let plan = BuildPlan::resolve(cfg, opts)?;

    let envsetup = plan.source_dir.join("build").join("envsetup.sh");
    if let Err(source) = std::fs::metadata(&envsetup) {
        return Err(ForgeError::EnvsetupMissing {
            dir: plan.source_dir,
            source,
        });
    }

    info!(
        device = %plan.device,
        target = %plan.target,
        variant = %plan.variant,
        source_dir = %plan.source_dir.display(),
        "launching build"
    );
    let outcome = runner.run(cancel, &plan.command(cfg, opts)).await?;
    Ok(outcome)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FleetDevice;

    #[test]
    fn defaults_come_from_config() -> Result<()> {
        let cfg = Config::default();
        let plan = BuildPlan::resolve(&cfg, &BuildOptions::default())?;
        assert_eq!(plan.device, "waffle");
        assert_eq!(plan.target, "recovery");
        assert_eq!(plan.variant, "userdebug");
        assert_eq!(plan.source_dir, PathBuf::from("./builds/lineageos-waffle"));
        Ok(())
    }

    #[test]
    fn explicit_options_win() -> Result<()> {
        let cfg = Config::default();
        let opts = BuildOptions {
            device: Some("op515dl1".into()),
            target: Some("bootimage".into()),
            variant: Some("eng".into()),
            repo_override: Some("crdroid".into()),
            ..BuildOptions::default()
        };
        let plan = BuildPlan::resolve(&cfg, &opts)?;
        assert_eq!(plan.source_dir, PathBuf::from("./builds/crdroid-op515dl1"));
        assert_eq!(
            plan.script(12),
            "set -euo pipefail; source build/envsetup.sh && lunch op515dl1-eng && m bootimage -j12"
        );
        Ok(())
    }

    #[test]
    fn unknown_device_uses_fallback_repository() -> Result<()> {
        let cfg = Config::default();
        let opts = BuildOptions {
            device: Some("bacon".into()),
            ..BuildOptions::default()
        };
        let plan = BuildPlan::resolve(&cfg, &opts)?;
        assert_eq!(plan.source_dir, PathBuf::from("./builds/android-bacon"));
        Ok(())
    }

    #[test]
    fn device_without_repository_uses_fallback() -> Result<()> {
        let mut cfg = Config::default();
        cfg.fleet = vec![FleetDevice::new("Pixel", "lynx", "primary", "")];
        let plan = BuildPlan::resolve(&cfg, &BuildOptions::default())?;
        assert_eq!(plan.source_dir, PathBuf::from("./builds/android-lynx"));
        Ok(())
    }

    #[test]
    fn empty_fleet_requires_device() {
        let mut cfg = Config::default();
        cfg.fleet.clear();
        let err = BuildPlan::resolve(&cfg, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, ForgeError::DeviceRequired));
    }

    #[test]
    fn command_carries_commander_and_flags() -> Result<()> {
        let cfg = Config::default();
        let opts = BuildOptions {
            dry_run: true,
            timeout: Some(Duration::from_secs(60)),
            ..BuildOptions::default()
        };
        let cmd = BuildPlan::resolve(&cfg, &opts)?.command(&cfg, &opts);
        assert_eq!(cmd.program, "bash");
        assert_eq!(cmd.args[0], "-lc");
        assert!(cmd.args[1].ends_with("m recovery -j8"));
        assert_eq!(cmd.env.get("ARK_COMMANDER").map(String::as_str), Some("koobie777"));
        assert!(cmd.dry_run);
        assert_eq!(cmd.timeout, Some(Duration::from_secs(60)));
        Ok(())
    }
}
