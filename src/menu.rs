// src/menu.rs

//! Interactive command deck.
//!
//! A plain numbered text menu driven line by line from an async reader, so
//! the same loop serves a terminal and scripted input in tests.

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::android::{self, BuildOptions, SyncOptions};
use crate::artifacts::{self, Manifest};
use crate::config::Config;
use crate::exec::Runner;
use crate::preflight;

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Selections offered by the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Build,
    Sync,
    Preflight,
    FleetStatus,
    UserGuide,
    Release,
    Exit,
}

impl MenuItem {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuItem::Build),
            "2" => Some(MenuItem::Sync),
            "3" => Some(MenuItem::Preflight),
            "4" => Some(MenuItem::FleetStatus),
            "5" => Some(MenuItem::UserGuide),
            "6" => Some(MenuItem::Release),
            "0" => Some(MenuItem::Exit),
            _ => None,
        }
    }
}

/// Run the menu until the user exits, input ends, or `cancel` fires.
pub async fn run_menu<R, W>(
    cfg: &Config,
    runner: &Runner,
    cancel: &CancellationToken,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        render_menu(cfg, out)?;
        write!(out, "Select ARKFORGE operation: ")?;
        out.flush()?;

        let Some(line) = next_line(input, cancel).await? else {
            return Ok(());
        };

        match MenuItem::parse(&line) {
            Some(MenuItem::Exit) => {
                show_exit_message(cfg, out)?;
                return Ok(());
            }
            Some(item) => dispatch(item, cfg, runner, cancel, out).await?,
            None => writeln!(out, "Unknown selection {:?}", line.trim())?,
        }

        write!(out, "Press Enter to return to the ARK Command Deck...")?;
        out.flush()?;
        if next_line(input, cancel).await?.is_none() {
            return Ok(());
        }
    }
}

async fn next_line<R>(input: &mut R, cancel: &CancellationToken) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    tokio::select! {
        read = input.read_line(&mut line) => {
            if read? == 0 {
                return Ok(None);
            }
            Ok(Some(line))
        }
        _ = cancel.cancelled() => Ok(None),
    }
}

async fn dispatch<W: Write>(
    item: MenuItem,
    cfg: &Config,
    runner: &Runner,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    match item {
        MenuItem::Build => {
            let res = android::build(runner, cancel, cfg, &BuildOptions::default()).await;
            if let Err(e) = res {
                error!(error = %e, "build failed");
            }
        }
        MenuItem::Sync => {
            let res = android::repo_sync(runner, cancel, cfg, &SyncOptions::default()).await;
            if let Err(e) = res {
                error!(error = %e, "repo sync failed");
            }
        }
        MenuItem::Preflight => {
            if let Err(e) = preflight::run_checks(cfg, &preflight::default_checks(), out) {
                error!(error = %e, "preflight failed");
            }
        }
        MenuItem::FleetStatus => show_fleet_status(cfg, out)?,
        MenuItem::UserGuide => show_user_guide(out)?,
        MenuItem::Release => {
            let manifest = Manifest::generate(cfg);
            match artifacts::write_manifest(artifacts::default_manifest_path(), &manifest) {
                Ok(path) => writeln!(out, "Manifest written to {}", path.display())?,
                Err(e) => error!(error = %e, "writing release manifest failed"),
            }
        }
        MenuItem::Exit => {}
    }
    info!(?item, "menu action finished");
    Ok(())
}

fn render_menu<W: Write>(cfg: &Config, out: &mut W) -> Result<()> {
    clear_screen(cfg, out)?;
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(out, "===============================================")?;
    writeln!(out, "             ARKFORGE COMMAND DECK             ")?;
    writeln!(out, "===============================================")?;
    writeln!(
        out,
        "Commander: {} | Mode: {} | Jobs: {}",
        cfg.commander,
        title_case(&cfg.mode),
        cfg.jobs
    )?;
    writeln!(out, "Time: {now} UTC | Version: {}", cfg.version)?;
    if in_tmux() {
        writeln!(out, "TMUX: active session detected")?;
    } else {
        writeln!(out, "TMUX: no session detected (launch via 'tmux new -s arkforge')")?;
    }
    writeln!(out, "Workspace: {}", cfg.build.workspace)?;
    writeln!(out)?;
    writeln!(out, "Operations:")?;
    writeln!(out, "  1) Build            - Build the fleet primary with defaults")?;
    writeln!(out, "  2) Repo Sync        - Sync repositories without building")?;
    writeln!(out, "  3) Preflight        - Check host prerequisites")?;
    writeln!(out)?;
    writeln!(out, "Fleet & Documentation:")?;
    writeln!(out, "  4) Fleet Status     - List all ARK Fleet devices")?;
    writeln!(out, "  5) User Guide       - Read the ARKFORGE user guide")?;
    writeln!(out, "  6) Release Manifest - Write artifacts/manifest.yaml")?;
    writeln!(out)?;
    writeln!(out, "  0) Exit ARKFORGE")?;
    writeln!(out)?;
    Ok(())
}

fn show_fleet_status<W: Write>(cfg: &Config, out: &mut W) -> Result<()> {
    clear_screen(cfg, out)?;
    writeln!(out, "============== ARK FLEET STATUS ==============")?;
    for device in &cfg.fleet {
        writeln!(
            out,
            "- {:<15} ({}) [{}]",
            device.name,
            device.codename,
            title_case(&device.role)
        )?;
        if !device.repository.is_empty() {
            writeln!(out, "    Repository: {}", device.repository)?;
        }
    }
    writeln!(out, "==============================================")?;
    Ok(())
}

fn show_user_guide<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "============== USER GUIDE ====================")?;
    writeln!(out, "- 'preflight' : Validate host prerequisites (Java, repo, ulimit)")?;
    writeln!(out, "- 'sync'      : Run repo sync in the configured workspace")?;
    writeln!(out, "- 'build'     : envsetup + lunch + m for a fleet device")?;
    writeln!(out, "- 'release'   : Write the release manifest")?;
    writeln!(out, "Every command accepts --dry-run where it would run external tools.")?;
    writeln!(out, "==============================================")?;
    Ok(())
}

fn show_exit_message<W: Write>(cfg: &Config, out: &mut W) -> Result<()> {
    clear_screen(cfg, out)?;
    writeln!(out, "===============================================")?;
    writeln!(out, " Commander {}, the ARK stands ready for return.", cfg.commander)?;
    writeln!(out, "===============================================")?;
    Ok(())
}

fn clear_screen<W: Write>(cfg: &Config, out: &mut W) -> Result<()> {
    if cfg.theme.enabled {
        write!(out, "{CLEAR_SCREEN}")?;
    }
    Ok(())
}

fn in_tmux() -> bool {
    std::env::var_os("TMUX").is_some()
}

fn title_case(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_selections() {
        assert_eq!(MenuItem::parse(" 4\n"), Some(MenuItem::FleetStatus));
        assert_eq!(MenuItem::parse("0"), Some(MenuItem::Exit));
        assert_eq!(MenuItem::parse("13"), None);
    }

    #[test]
    fn title_case_lowercases_the_tail() {
        assert_eq!(title_case("EXPERT"), "Expert");
        assert_eq!(title_case("primary"), "Primary");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn fleet_status_lists_devices() -> Result<()> {
        let mut out = Vec::new();
        show_fleet_status(&Config::default(), &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("- OnePlus 12      (waffle) [Primary]"));
        assert!(text.contains("    Repository: evolution"));
        Ok(())
    }
}
