// src/exec/outcome.rs

//! Classified results of a runner invocation.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Non-error results of [`Runner::run`](crate::exec::Runner::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Dry-run: the command was logged, nothing was spawned.
    Skipped,
    Succeeded,
}

/// How a process that did not succeed ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitDetails {
    Code(i32),
    /// Terminated by a signal (unix only).
    Signal(i32),
    /// Waiting on the child failed; the exit state is unknown.
    Wait(String),
}

impl ExitDetails {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitDetails::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitDetails::Signal(signal);
            }
        }
        ExitDetails::Wait(format!("unrecognised exit status: {status}"))
    }
}

impl fmt::Display for ExitDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitDetails::Code(code) => write!(f, "exit status {code}"),
            ExitDetails::Signal(signal) => write!(f, "terminated by signal {signal}"),
            ExitDetails::Wait(msg) => write!(f, "wait failed: {msg}"),
        }
    }
}

/// Why a runner invocation did not succeed. Never retried by the runner.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The process could not be started at all.
    #[error("start command '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command timeout after {timeout:?} (elapsed {elapsed:?}): {command}")]
    TimedOut {
        command: String,
        timeout: Duration,
        elapsed: Duration,
    },

    /// The external tool reported failure.
    #[error("command failed with {details}: {command}")]
    Failed {
        command: String,
        details: ExitDetails,
    },
}

impl ExecError {
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, ExecError::LaunchFailed { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_names_command_and_status() {
        let err = ExecError::Failed {
            command: "repo sync".into(),
            details: ExitDetails::Code(1),
        };
        assert_eq!(err.to_string(), "command failed with exit status 1: repo sync");
        assert!(!err.is_timeout());
        assert!(!err.is_launch_failure());
    }

    #[cfg(unix)]
    #[test]
    fn exit_details_from_raw_status() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(
            ExitDetails::from_status(ExitStatus::from_raw(3 << 8)),
            ExitDetails::Code(3)
        );
        assert_eq!(
            ExitDetails::from_status(ExitStatus::from_raw(libc::SIGKILL)),
            ExitDetails::Signal(libc::SIGKILL)
        );
    }
}
