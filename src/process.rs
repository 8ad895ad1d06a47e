//! External command execution.
//!
//! The install and deploy steps shell out through [`ProcessRunner`] so the
//! pipeline can be exercised without real package managers.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::info;

use crate::config::CommandConfig;

/// How an external command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ProcessOutcome {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failed(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external command to completion
pub trait ProcessRunner {
    /// Run `command` followed by `extra_args` in `cwd`.
    ///
    /// Output is forwarded live to this process's stdout and stderr.
    /// Returns an error only when the command could not be started.
    fn run(
        &self,
        command: &CommandConfig,
        extra_args: &[String],
        cwd: &Path,
    ) -> anyhow::Result<ProcessOutcome>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        command: &CommandConfig,
        extra_args: &[String],
        cwd: &Path,
    ) -> anyhow::Result<ProcessOutcome> {
        info!(
            command = %command.command,
            args = ?command.args.iter().chain(extra_args).collect::<Vec<_>>(),
            cwd = %cwd.display(),
            "Running"
        );
        let status = Command::new(&command.command)
            .args(&command.args)
            .args(extra_args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to start `{}`", command.command))?;
        Ok(ProcessOutcome {
            code: status.code(),
        })
    }
}

/// Apply a binary override from the environment, e.g. `LAMBDAFORGE_NPM_BIN`
pub fn with_bin_override(mut command: CommandConfig, bin: Option<String>) -> CommandConfig {
    if let Some(bin) = bin.filter(|b| !b.is_empty()) {
        command.command = bin;
    }
    command
}
