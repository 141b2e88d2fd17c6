#![allow(dead_code)]

use std::path::Path;

use arkforge::config::Config;
use arkforge::exec::LogicalCommand;

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn workspace(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.build.workspace = dir.as_ref().to_string_lossy().into_owned();
        self
    }

    pub fn jobs(mut self, jobs: u32) -> Self {
        self.config.jobs = jobs;
        self
    }

    pub fn commander(mut self, name: &str) -> Self {
        self.config.commander = name.to_string();
        self
    }

    pub fn no_theme(mut self) -> Self {
        self.config.theme.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `sh -c <script>`.
pub fn sh(script: &str) -> LogicalCommand {
    LogicalCommand::new("sh").arg("-c").arg(script)
}
