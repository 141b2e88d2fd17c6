// src/android/sync.rs

//! `repo sync` for the configured workspace.

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::errors::Result;
use crate::exec::{LogicalCommand, Outcome, Runner};

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Manifest to sync; only its file name is passed on.
    pub manifest: Option<String>,
    pub force: bool,
    pub dry_run: bool,
    pub timeout: Option<Duration>,
}

pub fn sync_command(cfg: &Config, opts: &SyncOptions) -> LogicalCommand {
    let mut cmd = LogicalCommand::new("repo")
        .arg("sync")
        .arg("--current-branch")
        .arg(format!("--jobs={}", cfg.jobs));

    let manifest = opts
        .manifest
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .and_then(|m| Path::new(m).file_name())
        .map(|name| name.to_string_lossy().into_owned());
    if let Some(manifest) = manifest {
        cmd = cmd.arg(format!("--manifest-name={manifest}"));
    }
    if opts.force {
        cmd = cmd.arg("--force-sync");
    }

    cmd.current_dir(&cfg.build.workspace)
        .env("ARK_COMMANDER", &cfg.commander)
        .timeout(opts.timeout)
        .dry_run(opts.dry_run)
}

/// Prepare the workspace and run `repo sync` inside it.
pub async fn repo_sync(
    runner: &Runner,
    cancel: &CancellationToken,
    cfg: &Config,
    opts: &SyncOptions,
) -> Result<Outcome> {
    std::fs::create_dir_all(&cfg.build.workspace)?;
    let outcome = runner.run(cancel, &sync_command(cfg, opts)).await?;
    Ok(outcome)
}
