// src/preflight/checks.rs

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Check, CheckResult};
use crate::config::Config;

/// A binary that must (or should) be on `PATH`.
#[derive(Debug, Clone)]
pub struct CommandCheck {
    name: String,
    binary: String,
    optional: bool,
}

impl CommandCheck {
    pub fn required(name: &str, binary: &str) -> Self {
        Self {
            name: name.to_string(),
            binary: binary.to_string(),
            optional: false,
        }
    }

    pub fn optional(name: &str, binary: &str) -> Self {
        Self {
            optional: true,
            ..Self::required(name, binary)
        }
    }
}

impl Check for CommandCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, _cfg: &Config) -> CheckResult {
        match which::which(&self.binary) {
            Ok(path) => CheckResult::pass(&self.name, format!("found at {}", path.display())),
            Err(e) => CheckResult::fail(
                &self.name,
                self.optional,
                format!("{} command not found in PATH", self.binary),
            )
            .with_error(e),
        }
    }
}

/// The build workspace exists (or can be created) and is writable.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceCheck;

impl Check for WorkspaceCheck {
    fn name(&self) -> &str {
        "Workspace"
    }

    fn evaluate(&self, cfg: &Config) -> CheckResult {
        let name = self.name();
        let dir = cfg.build.workspace.trim();
        if dir.is_empty() {
            return CheckResult::fail(name, false, "build.workspace not set");
        }

        let dir = Path::new(dir);
        if let Err(e) = fs::create_dir_all(dir) {
            return CheckResult::fail(name, false, "failed to create workspace").with_error(e);
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let probe = dir.join(format!(".arkforge-touch-{stamp}"));
        if let Err(e) = fs::write(&probe, b"ok") {
            return CheckResult::fail(name, false, "unable to write inside workspace").with_error(e);
        }
        let _ = fs::remove_file(&probe);

        CheckResult::pass(name, format!("ready at {}", dir.display()))
    }
}

/// Soft limit on open file descriptors.
#[derive(Debug, Clone, Copy)]
pub struct OpenFilesCheck {
    minimum: u64,
}

impl OpenFilesCheck {
    pub fn new(minimum: u64) -> Self {
        Self { minimum }
    }

    /// Shared by the real check and tests that inject a limit.
    pub fn judge(&self, limit: Option<u64>) -> CheckResult {
        let name = self.name();
        match limit {
            None => CheckResult::pass(name, "not supported on this platform"),
            Some(limit) if limit < self.minimum => CheckResult::fail(
                name,
                false,
                format!("nofile={limit} (<{}). Increase ulimit -n.", self.minimum),
            ),
            Some(limit) => CheckResult::pass(name, format!("nofile={limit}")),
        }
    }
}

impl Check for OpenFilesCheck {
    fn name(&self) -> &str {
        "Ulimit"
    }

    fn evaluate(&self, _cfg: &Config) -> CheckResult {
        self.judge(open_files_limit())
    }
}

#[cfg(unix)]
fn open_files_limit() -> Option<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, writable rlimit for the duration of the call.
    let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
    if rc != 0 {
        return None;
    }
    u64::try_from(limit.rlim_cur).ok()
}

#[cfg(not(unix))]
fn open_files_limit() -> Option<u64> {
    None
}
