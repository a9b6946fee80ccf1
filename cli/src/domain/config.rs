//! Raw provisioning configuration as read from `provision.yaml`.
//!
//! Pure data only, no I/O. Defaults and validation are applied by
//! [`crate::domain::plan::resolve`].

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

/// Remote directory that receives uploaded scripts when `remote_folder` is unset.
pub const DEFAULT_REMOTE_FOLDER: &str = "/tmp/deno-provision-work";

/// Where the Deno installer script places the executable for root.
pub const DEFAULT_REMOTE_RUNTIME_PATH: &str = "/root/.local/bin/deno";

/// Local executable used to bundle scripts.
pub const DEFAULT_BUNDLER_BIN: &str = "deno";

/// Per-command timeout applied by the concrete channels.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 1800;

// ── Config schema ────────────────────────────────────────────────────────────

/// User-supplied configuration, before defaults and validation.
///
/// Unknown keys are ignored so configs written for newer versions still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Local Deno build to upload instead of running the network installer.
    pub local_runtime_bin: Option<String>,

    /// Assume Deno is already installed on the target.
    pub skip_install: bool,

    /// Destination folder for uploaded scripts.
    pub remote_folder: Option<String>,

    /// Scripts to bundle, upload and run, in order.
    pub scripts: Vec<String>,

    /// Upload scripts but do not run them.
    pub skip_provision: bool,

    /// Version tag passed to the Deno installer, e.g. `v1.5.0`.
    pub target_runtime_version: Option<String>,

    /// Upload scripts as-is instead of bundling them locally first.
    pub no_bundle: bool,

    /// Local bundler executable.
    pub bundler_bin: Option<String>,

    /// Absolute path of the Deno executable on the target.
    pub remote_runtime_path: Option<String>,

    /// Timeout for a single remote command or upload, in seconds.
    pub command_timeout_secs: Option<u64>,
}

impl ProvisionConfig {
    /// Overlay `other` on top of `self`: set fields in `other` win, boolean
    /// flags are OR-ed, and a non-empty script list replaces the base list.
    #[must_use]
    pub fn merge(mut self, other: ProvisionConfig) -> Self {
        if other.local_runtime_bin.is_some() {
            self.local_runtime_bin = other.local_runtime_bin;
        }
        if other.remote_folder.is_some() {
            self.remote_folder = other.remote_folder;
        }
        if !other.scripts.is_empty() {
            self.scripts = other.scripts;
        }
        if other.target_runtime_version.is_some() {
            self.target_runtime_version = other.target_runtime_version;
        }
        if other.bundler_bin.is_some() {
            self.bundler_bin = other.bundler_bin;
        }
        if other.remote_runtime_path.is_some() {
            self.remote_runtime_path = other.remote_runtime_path;
        }
        if other.command_timeout_secs.is_some() {
            self.command_timeout_secs = other.command_timeout_secs;
        }
        self.skip_install |= other.skip_install;
        self.skip_provision |= other.skip_provision;
        self.no_bundle |= other.no_bundle;
        self
    }

    /// Effective per-command timeout in seconds.
    #[must_use]
    pub fn command_timeout_secs(&self) -> u64 {
        self.command_timeout_secs
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
