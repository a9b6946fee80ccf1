//! Runtime installation strategies and the remote command lines they issue.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::remote::shell_quote;

/// Public bootstrap script that installs Deno under `$HOME/.local`.
pub const BOOTSTRAP_URL: &str = "https://deno.land/x/install/install.sh";

/// Downloader required by the bootstrap command.
pub const DOWNLOADER: &str = "curl";

/// Best-effort OS description, logged before installing.
pub const OS_PROBE: &str = "if [ -f /etc/os-release ]; then . /etc/os-release && echo \"$PRETTY_NAME\"; else uname -sr; fi";

/// A package manager that can install the downloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManager {
    /// Executable looked up with `command -v`.
    pub name: &'static str,
    /// Command line that installs the downloader.
    pub install: &'static str,
}

/// Package managers tried in order; the first one found on the target wins.
pub const PACKAGE_MANAGERS: &[PackageManager] = &[
    PackageManager {
        name: "apt-get",
        install: "apt-get update && apt-get install -y curl",
    },
    PackageManager {
        name: "yum",
        install: "yum update -y && yum install -y curl",
    },
    PackageManager {
        name: "apk",
        install: "apk add --no-cache curl",
    },
];

/// How the runtime ends up on the target. Selected once at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum InstallStrategy {
    /// The runtime is assumed to be present already.
    Skip,
    /// Fetch and run the public installer, optionally pinned to a version tag.
    NetworkInstall { version: Option<String> },
    /// Upload a local runtime binary to the remote runtime path.
    LocalBinaryUpload { local_path: PathBuf },
}

impl InstallStrategy {
    /// Short human-readable name.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Skip => "skip".to_string(),
            Self::NetworkInstall { version: None } => "network install (latest)".to_string(),
            Self::NetworkInstall {
                version: Some(v),
            } => format!("network install ({v})"),
            Self::LocalBinaryUpload { local_path } => {
                format!("upload local binary {}", local_path.display())
            }
        }
    }
}

/// `command -v <tool>`, exit 0 when the tool is on the remote `PATH`.
#[must_use]
pub fn probe_command(tool: &str) -> String {
    format!("command -v {}", shell_quote(tool))
}

/// Download and run the bootstrap installer.
#[must_use]
pub fn bootstrap_command(version: Option<&str>) -> String {
    match version {
        Some(v) => format!("curl -fsSL {BOOTSTRAP_URL} | sh -s {}", shell_quote(v)),
        None => format!("curl -fsSL {BOOTSTRAP_URL} | sh"),
    }
}

/// Mark the uploaded runtime binary executable.
#[must_use]
pub fn chmod_command(path: &str) -> String {
    format!("chmod +x {}", shell_quote(path))
}

/// Run one uploaded script with all permissions granted.
#[must_use]
pub fn run_script_command(runtime: &str, script: &str) -> String {
    format!("{} run -A {}", shell_quote(runtime), shell_quote(script))
}
