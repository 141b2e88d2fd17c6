// src/preflight/mod.rs

//! Host readiness checks.
//!
//! Each check is a named value implementing [`Check`]. Checks are cheap,
//! synchronous existence tests and never go through the process runner.

pub mod checks;

use std::fmt;
use std::io::Write;

use tracing::{error, info};

use crate::config::Config;
use crate::errors::{ForgeError, Result};

pub use checks::{CommandCheck, OpenFilesCheck, WorkspaceCheck};

/// Minimum open-file limit a full Android build needs.
pub const MIN_OPEN_FILES: u64 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    /// An optional check did not pass.
    Warn,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
        })
    }
}

#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: Status,
    pub details: String,
    pub error: Option<anyhow::Error>,
}

impl CheckResult {
    pub fn pass(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Pass,
            details: details.into(),
            error: None,
        }
    }

    /// A failed check; `optional` checks are downgraded to a warning.
    pub fn fail(name: &str, optional: bool, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: if optional { Status::Warn } else { Status::Fail },
            details: details.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, err: impl Into<anyhow::Error>) -> Self {
        self.error = Some(err.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.status == Status::Fail
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:<12} - {}", self.status, self.name, self.details)
    }
}

/// One host readiness check.
pub trait Check {
    fn name(&self) -> &str;
    fn evaluate(&self, cfg: &Config) -> CheckResult;
}

/// The checks `arkforge preflight` runs, in order.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(CommandCheck::required("Java", "java")),
        Box::new(CommandCheck::required("Repo", "repo")),
        Box::new(CommandCheck::required("Git", "git")),
        Box::new(CommandCheck::optional("ccache", "ccache")),
        Box::new(WorkspaceCheck),
        Box::new(OpenFilesCheck::new(MIN_OPEN_FILES)),
    ]
}

/// Evaluate `checks`, print one line per result to `out`, and fail if any
/// required check failed.
pub fn run_checks<W: Write>(cfg: &Config, checks: &[Box<dyn Check>], out: &mut W) -> Result<()> {
    info!("starting preflight checks");

    let mut failed = 0;
    for check in checks {
        let result = check.evaluate(cfg);
        writeln!(out, "{result}")?;
        if let Some(err) = &result.error {
            error!(check = %result.name, error = %err, "preflight check error");
        }
        if result.is_blocking() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(ForgeError::Preflight { failed });
    }
    info!("preflight passed");
    Ok(())
}

/// Run the default checks against stdout.
pub fn run_preflight(cfg: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    run_checks(cfg, &default_checks(), &mut stdout.lock())
}
