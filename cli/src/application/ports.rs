//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::config::ProvisionConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Result of one command run on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status, `-1` when the process was killed by a signal.
    pub code: i32,
    /// Interleaved stdout and stderr as reported by the channel.
    pub output: String,
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Build a `CommandOutput` from a finished local process.
    #[must_use]
    pub fn from_process(output: &Output) -> Self {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Self {
            code: output.status.code().unwrap_or(-1),
            output: combined,
        }
    }
}

// ── Remote Channel Port ───────────────────────────────────────────────────────

/// Command execution and file transfer on the provisioning target.
#[allow(async_fn_in_trait)]
pub trait Communicator {
    /// Run a shell command line on the target and wait for it.
    ///
    /// A non-zero exit status is reported through `CommandOutput::code`,
    /// not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the channel itself fails.
    async fn run_command(&self, command: &str) -> Result<CommandOutput>;

    /// Write `contents` to `remote_path`, replacing any existing file.
    async fn upload_file(&self, remote_path: &str, contents: &[u8]) -> Result<()>;

    /// Create `remote_path` and its parents. Succeeds if it already exists.
    async fn create_directory(&self, remote_path: &str) -> Result<()>;
}

// ── Bundler Port ──────────────────────────────────────────────────────────────

/// Local script bundling.
#[allow(async_fn_in_trait)]
pub trait ScriptBundler {
    /// Bundle `source` into a single file at `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundler cannot run or exits unsuccessfully.
    async fn bundle(&self, source: &Path, output: &Path) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with stdin piped from `stdin`.
    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit the final failure message of a run.
    fn error(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts where the raw provisioning configuration comes from.
pub trait ConfigStore {
    /// Load the raw configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the source exists but cannot be read or parsed.
    fn load(&self) -> Result<ProvisionConfig>;
    /// Location of the configuration source.
    fn path(&self) -> PathBuf;
}
