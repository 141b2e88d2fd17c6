// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that turns a command description into a running process and a
//! stream of log records lives here:
//!
//! - [`command`] holds the [`LogicalCommand`] value built by callers.
//! - [`sink`] splits raw pipe bytes into cleaned, per-line log records.
//! - [`runner`] spawns the process, drains both pipes through sinks, enforces
//!   the deadline and classifies the result.
//! - [`outcome`] defines the classification (`Outcome` / `ExecError`).

pub mod command;
pub mod outcome;
pub mod runner;
pub mod sink;

pub use command::{LogicalCommand, parse_duration};
pub use outcome::{ExecError, ExitDetails, Outcome};
pub use runner::{DEFAULT_KILL_GRACE, DEFAULT_TIMEOUT, Runner};
pub use sink::{LineSink, Stream};
