// src/android/mod.rs

//! Builders that turn configuration plus CLI flags into runner commands.

pub mod build;
pub mod sync;

pub use build::{BuildOptions, BuildPlan, build};
pub use sync::{SyncOptions, repo_sync, sync_command};
