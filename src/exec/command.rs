// src/exec/command.rs

//! Logical description of one external process invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// An external command, described before it is executed.
///
/// Built by the android command builders and handed to
/// [`Runner::run`](crate::exec::Runner::run). The value itself never touches
/// the OS; the runner decides whether to spawn it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// `None` runs in the current directory.
    pub working_dir: Option<PathBuf>,
    /// Applied on top of the inherited environment; overrides win.
    pub env: BTreeMap<String, String>,
    /// `None` or zero falls back to the runner's default deadline.
    pub timeout: Option<Duration>,
    pub dry_run: bool,
}

impl LogicalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
            timeout: None,
            dry_run: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.working_dir = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir.to_path_buf())
        };
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Render program and arguments the way they would be typed in a shell.
    ///
    /// Arguments that a shell would split or interpret are single-quoted.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_word(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let seconds = |factor: u64| {
        value
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration too large: '{}'", s))
    };
    let duration = match unit.as_str() {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => seconds(60)?,
        "h" => seconds(60 * 60)?,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    if duration.is_zero() {
        return Err("timeout must be positive".to_string());
    }
    Ok(duration)
}
