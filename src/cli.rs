// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::android::{BuildOptions, SyncOptions};
use crate::exec::parse_duration;

/// Command-line arguments for `arkforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "arkforge",
    version,
    about = "Modular Android build orchestrator for a device fleet.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the forge configuration file (YAML).
    #[arg(long, value_name = "PATH", default_value = "forge.yaml", global = true)]
    pub config: PathBuf,

    /// Emit structured JSON log lines instead of human-readable ones.
    #[arg(long, global = true)]
    pub json: bool,

    /// Never open the interactive menu; require an explicit sub-command.
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ARKFORGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run envsetup + lunch + m for a device.
    Build(BuildArgs),
    /// Run repo sync for the configured workspace.
    Sync(SyncArgs),
    /// Run host readiness checks.
    Preflight,
    /// Generate release metadata (artifacts manifest).
    Release(ReleaseArgs),
    /// Launch the interactive command deck.
    Menu,
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Device codename to build (defaults to the fleet primary).
    #[arg(long)]
    pub device: Option<String>,

    /// Build target (recovery, bootimage, ...).
    #[arg(long)]
    pub target: Option<String>,

    /// Lunch variant (user, userdebug, eng).
    #[arg(long, default_value = "userdebug")]
    pub variant: String,

    /// Override the repository directory inside the workspace.
    #[arg(long)]
    pub repo: Option<String>,

    /// Log the command without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Abort the build after this long (e.g. `90m`, `2h`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Custom manifest name to sync.
    #[arg(long)]
    pub manifest: Option<String>,

    /// Force sync (`repo sync --force-sync`).
    #[arg(long)]
    pub force: bool,

    /// Log the command without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Abort the sync after this long (e.g. `30m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Args)]
pub struct ReleaseArgs {
    /// Path to write the manifest to.
    #[arg(long, default_value = "artifacts/manifest.yaml")]
    pub output: PathBuf,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<BuildArgs> for BuildOptions {
    fn from(args: BuildArgs) -> Self {
        BuildOptions {
            device: args.device,
            target: args.target,
            variant: Some(args.variant),
            repo_override: args.repo,
            dry_run: args.dry_run,
            timeout: args.timeout,
        }
    }
}

impl From<SyncArgs> for SyncOptions {
    fn from(args: SyncArgs) -> Self {
        SyncOptions {
            manifest: args.manifest,
            force: args.force,
            dry_run: args.dry_run,
            timeout: args.timeout,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
