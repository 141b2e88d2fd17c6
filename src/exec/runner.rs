// src/exec/runner.rs

//! Runs one [`LogicalCommand`] as an external process under a deadline.

use std::io::Write;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, error, info, warn};

use super::command::LogicalCommand;
use super::outcome::{ExecError, ExitDetails, Outcome};
use super::sink::{LineSink, Stream};

/// Deadline applied when a command does not carry its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// How long a terminated process (and a lingering pipe) gets before the
/// runner stops waiting politely.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8 * 1024;

enum Waited {
    Exited(std::io::Result<ExitStatus>),
    DeadlineExpired,
    Cancelled,
}

/// Executes logical commands, streaming their output into `tracing`.
///
/// The runner keeps no state between calls apart from its logging
/// destination and timing knobs, so one instance can serve concurrent
/// invocations.
#[derive(Debug, Clone)]
pub struct Runner {
    dispatch: Dispatch,
    default_timeout: Duration,
    kill_grace: Duration,
}

impl Runner {
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            default_timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.default_timeout = timeout;
        }
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `command` to completion, its deadline, or until `cancel` fires.
    ///
    /// Dry-run commands are logged and reported as [`Outcome::Skipped`]
    /// without touching the OS.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        command: &LogicalCommand,
    ) -> Result<Outcome, ExecError> {
        self.run_inner(cancel, command)
            .with_subscriber(self.dispatch.clone())
            .await
    }

    async fn run_inner(
        &self,
        cancel: &CancellationToken,
        command: &LogicalCommand,
    ) -> Result<Outcome, ExecError> {
        if command.dry_run {
            info!(
                cmd = %command.program,
                args = ?command.args,
                "dry-run: skip execution"
            );
            return Ok(Outcome::Skipped);
        }

        let timeout = command
            .timeout
            .filter(|t| !t.is_zero())
            .unwrap_or(self.default_timeout);
        let derived = cancel.child_token();
        let cmdline = command.command_line();

        let stdout_sink = LineSink::new(self.dispatch.clone(), Stream::Stdout);
        let stderr_sink = LineSink::new(self.dispatch.clone(), Stream::Stderr);

        let start = Instant::now();
        info!(cmd = %cmdline, "starting command");

        let mut child = spawn(command).map_err(|source| ExecError::LaunchFailed {
            program: command.program.clone(),
            source,
        })?;

        // `Child::id` is gone once the child has been reaped.
        #[cfg_attr(not(unix), allow(unused_variables))]
        let pid = child.id();
        let stop_draining = CancellationToken::new();
        let stdout_task = spawn_drain(child.stdout.take(), stdout_sink, stop_draining.clone());
        let stderr_task = spawn_drain(child.stderr.take(), stderr_sink, stop_draining.clone());

        let deadline = sleep(timeout);
        tokio::pin!(deadline);

        let waited = tokio::select! {
            res = child.wait() => Waited::Exited(res),
            _ = &mut deadline => {
                derived.cancel();
                Waited::DeadlineExpired
            }
            _ = derived.cancelled() => Waited::Cancelled,
        };
        // An expiry that races a normal exit still counts as a timeout.
        let timed_out = matches!(waited, Waited::DeadlineExpired) || deadline.is_elapsed();

        let status = match waited {
            Waited::Exited(res) => res,
            Waited::DeadlineExpired => {
                warn!(cmd = %cmdline, ?timeout, "deadline exceeded; terminating process");
                self.terminate(&mut child).await
            }
            Waited::Cancelled => {
                warn!(cmd = %cmdline, "cancellation requested; terminating process");
                self.terminate(&mut child).await
            }
        };

        // Descendants may keep a pipe open after the direct child is gone.
        let stopper = {
            let stop = stop_draining.clone();
            let grace = self.kill_grace;
            tokio::spawn(async move {
                sleep(grace).await;
                stop.cancel();
            })
        };
        let sinks = [join_drain(stdout_task).await, join_drain(stderr_task).await];
        stopper.abort();
        if stop_draining.is_cancelled() {
            warn!(cmd = %cmdline, "output still open after exit; terminating leftover processes");
            #[cfg(unix)]
            signal_group(pid, libc::SIGTERM);
        }
        for mut sink in sinks.into_iter().flatten() {
            if let Err(e) = sink.flush() {
                warn!(pipe = sink.stream().as_str(), error = %e, "flushing output failed");
            }
        }

        let duration = start.elapsed();
        let result = classify(cmdline.clone(), timeout, duration, timed_out, status);
        match &result {
            Ok(_) => info!(?duration, cmd = %cmdline, "command finished"),
            Err(err) => error!(?duration, cmd = %cmdline, error = %err, "command finished"),
        }
        result
    }

    /// Ask the process group to stop, then kill it once the grace period is
    /// over.
    async fn terminate(&self, child: &mut Child) -> std::io::Result<ExitStatus> {
        #[cfg(unix)]
        signal_group(child.id(), libc::SIGTERM);
        #[cfg(not(unix))]
        if let Err(e) = child.start_kill() {
            debug!(error = %e, "start_kill failed");
        }

        match tokio::time::timeout(self.kill_grace, child.wait()).await {
            Ok(res) => res,
            Err(_) => {
                warn!(grace = ?self.kill_grace, "process ignored termination; killing");
                #[cfg(unix)]
                signal_group(child.id(), libc::SIGKILL);
                child.kill().await?;
                child.wait().await
            }
        }
    }
}

fn spawn(command: &LogicalCommand) -> std::io::Result<Child> {
    if command.program.trim().is_empty() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "program must not be empty",
        ));
    }

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .envs(&command.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &command.working_dir {
        cmd.current_dir(dir);
    }
    // Own group so termination reaches the whole build tree.
    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn()
}

#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: libc::c_int) {
    let Some(pid) = pid else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions; a negative pid
    // addresses the process group created for this child.
    let rc = unsafe { libc::kill(-pgid, signal) };
    if rc != 0 {
        debug!(
            pid,
            signal,
            error = %std::io::Error::last_os_error(),
            "signalling process group failed"
        );
    }
}

fn spawn_drain<R>(
    reader: Option<R>,
    mut sink: LineSink,
    stop: CancellationToken,
) -> JoinHandle<LineSink>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(
        async move {
            let Some(mut reader) = reader else {
                return sink;
            };
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                let read = tokio::select! {
                    res = reader.read(&mut buf) => res,
                    _ = stop.cancelled() => {
                        warn!(pipe = sink.stream().as_str(), "pipe still open after exit; discarding further output");
                        break;
                    }
                };
                match read {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Err(e) = sink.write_all(&buf[..n]) {
                            warn!(pipe = sink.stream().as_str(), error = %e, "buffering output failed");
                        }
                    }
                    Err(e) => {
                        warn!(pipe = sink.stream().as_str(), error = %e, "reading output failed");
                        break;
                    }
                }
            }
            sink
        }
        .with_current_subscriber(),
    )
}

async fn join_drain(task: JoinHandle<LineSink>) -> Option<LineSink> {
    match task.await {
        Ok(sink) => Some(sink),
        Err(e) => {
            warn!(error = %e, "output drain task failed; trailing output lost");
            None
        }
    }
}

fn classify(
    command: String,
    timeout: Duration,
    elapsed: Duration,
    timed_out: bool,
    status: std::io::Result<ExitStatus>,
) -> Result<Outcome, ExecError> {
    if timed_out {
        return Err(ExecError::TimedOut {
            command,
            timeout,
            elapsed,
        });
    }
    match status {
        Ok(status) if status.success() => Ok(Outcome::Succeeded),
        Ok(status) => Err(ExecError::Failed {
            command,
            details: ExitDetails::from_status(status),
        }),
        Err(e) => Err(ExecError::Failed {
            command,
            details: ExitDetails::Wait(e.to_string()),
        }),
    }
}
