//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator at the command boundary.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// A single configuration violation found while resolving a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one script must be specified")]
    NoScripts,

    #[error("bad script '{path}': {reason}")]
    MissingScript { path: String, reason: String },

    #[error("scripts '{first}' and '{second}' share the file name '{name}' and would overwrite each other on the target")]
    DuplicateScriptName {
        first: String,
        second: String,
        name: String,
    },

    #[error("bad path to local runtime binary '{path}': {reason}")]
    MissingRuntimeBinary { path: String, reason: String },

    #[error("if local_runtime_bin is set, skip_install cannot be true")]
    SkipInstallWithLocalBinary,

    #[error("remote runtime path must be absolute, got '{0}'")]
    RelativeRuntimePath(String),

    #[error("remote_folder cannot be empty")]
    EmptyRemoteFolder,

    #[error("invalid target_runtime_version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}

/// Every violation found in one configuration, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl ConfigErrors {
    /// The collected violations.
    #[must_use]
    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration error(s):", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  * {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

// ── Remote errors ─────────────────────────────────────────────────────────────

/// Failure of one operation on the remote channel.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("`{command}` exited with status {code}")]
    NonZeroExit { command: String, code: i32 },

    #[error("`{command}` failed: {source:#}")]
    Channel {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no supported package manager found (tried {tried})")]
    NoPackageManager { tried: String },

    #[error("{tool} installed, but not available to the remote shell")]
    DownloaderUnavailable { tool: String },
}

impl RemoteError {
    /// The command line that failed, when the failure came from a command.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::NonZeroExit { command, .. } | Self::Channel { command, .. } => Some(command),
            Self::NoPackageManager { .. } | Self::DownloaderUnavailable { .. } => None,
        }
    }
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Stage of the provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Bundle,
    Install,
    Upload,
    Execute,
}

impl Phase {
    /// Lowercase phase name used in messages and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bundle => "bundle",
            Self::Install => "install",
            Self::Upload => "upload",
            Self::Execute => "execute",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a provisioning run. Any variant aborts the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("error bundling {}: {source:#}", script.display())]
    Bundle {
        script: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot create bundle staging directory: {0}")]
    Staging(#[source] std::io::Error),

    #[error("error installing deno: {0}")]
    Install(#[source] RemoteError),

    #[error("error creating remote directory {dir}: {source}")]
    RemoteDir {
        dir: String,
        #[source]
        source: RemoteError,
    },

    #[error("error uploading {} to {remote}: {source:#}", local.display())]
    Upload {
        local: PathBuf,
        remote: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{} is a directory, expected a deno script", .0.display())]
    DirectoryScript(PathBuf),

    #[error("error running {script}: {source}")]
    Execution {
        script: String,
        #[source]
        source: RemoteError,
    },

    #[error("provisioning cancelled during {phase}")]
    Cancelled { phase: Phase },
}

impl ProvisionError {
    /// The phase in which the run failed.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Bundle { .. } | Self::Staging(_) => Phase::Bundle,
            Self::Install(_) => Phase::Install,
            Self::RemoteDir { .. } | Self::Upload { .. } | Self::DirectoryScript(_) => {
                Phase::Upload
            }
            Self::Execution { .. } => Phase::Execute,
            Self::Cancelled { phase } => *phase,
        }
    }

    /// Whether the run was aborted by the caller rather than by a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Stable machine-readable code for JSON output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Bundle { .. } | Self::Staging(_) => "BUNDLE_FAILED",
            Self::Install(_) => "INSTALL_FAILED",
            Self::RemoteDir { .. } | Self::Upload { .. } => "UPLOAD_FAILED",
            Self::DirectoryScript(_) => "SCRIPT_IS_DIRECTORY",
            Self::Execution { .. } => "EXECUTION_FAILED",
            Self::Cancelled { .. } => "CANCELLED",
        }
    }
}
