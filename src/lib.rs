// src/lib.rs

pub mod android;
pub mod artifacts;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod menu;
pub mod preflight;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, info, warn};

use crate::artifacts::Manifest;
use crate::cli::{CliArgs, Command};
use crate::config::Config;
use crate::exec::{Outcome, Runner};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the process runner (bound to `dispatch`)
/// - Ctrl-C handling
/// - the selected sub-command
pub async fn run(args: CliArgs, dispatch: Dispatch) -> Result<()> {
    let cfg = config::load(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;
    let runner = Runner::new(dispatch);
    let cancel = CancellationToken::new();

    // Ctrl-C → cancel whatever is running; the runner terminates the child.
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("interrupt received; cancelling");
            cancel.cancel();
        });
    }

    match args.command {
        Some(command) => run_command(command, &cfg, &runner, &cancel).await,
        None if args.non_interactive => {
            println!("Non-interactive mode enabled; select an explicit sub-command.");
            Ok(())
        }
        None => run_command(Command::Menu, &cfg, &runner, &cancel).await,
    }
}

async fn run_command(
    command: Command,
    cfg: &Config,
    runner: &Runner,
    cancel: &CancellationToken,
) -> Result<()> {
    match command {
        Command::Build(args) => {
            let outcome = android::build(runner, cancel, cfg, &args.into()).await?;
            report(outcome, "build");
        }
        Command::Sync(args) => {
            let outcome = android::repo_sync(runner, cancel, cfg, &args.into()).await?;
            report(outcome, "sync");
        }
        Command::Preflight => preflight::run_preflight(cfg)?,
        Command::Release(args) => {
            let manifest = Manifest::generate(cfg);
            artifacts::write_manifest(&args.output, &manifest)?;
        }
        Command::Menu => {
            let mut input = BufReader::new(tokio::io::stdin());
            let stdout = std::io::stdout();
            menu::run_menu(cfg, runner, cancel, &mut input, &mut stdout.lock()).await?;
        }
    }
    Ok(())
}

fn report(outcome: Outcome, what: &str) {
    match outcome {
        Outcome::Skipped => info!("{what}: dry-run complete (no execution)"),
        Outcome::Succeeded => info!("{what}: completed"),
    }
}
