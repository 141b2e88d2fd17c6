// src/logging.rs

//! Logging setup for `arkforge` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `ARKFORGE_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR; `--json` switches to one JSON object per line.

use anyhow::{Context, Result};
use tracing::Dispatch;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Build the process-wide subscriber, install it as the global default and
/// return a handle to it.
///
/// The returned [`Dispatch`] is what gets passed to the
/// [`Runner`](crate::exec::Runner). Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, json: bool) -> Result<Dispatch> {
    let level = resolve_level(cli_level, std::env::var("ARKFORGE_LOG").ok().as_deref());

    let builder = fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let dispatch = if json {
        Dispatch::new(builder.json().finish())
    } else {
        Dispatch::new(builder.finish())
    };

    tracing::dispatcher::set_global_default(dispatch.clone())
        .context("installing global tracing subscriber")?;
    Ok(dispatch)
}

fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(tracing::Level::INFO),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
