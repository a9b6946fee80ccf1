//! Resolution of a raw [`ProvisionConfig`] into an immutable [`ProvisioningPlan`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::config::{
    DEFAULT_BUNDLER_BIN, DEFAULT_REMOTE_FOLDER, DEFAULT_REMOTE_RUNTIME_PATH, ProvisionConfig,
};
use crate::domain::error::{ConfigError, ConfigErrors};
use crate::domain::install::InstallStrategy;
use crate::domain::remote::{base_name, is_absolute};

/// Fully-resolved provisioning plan. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningPlan {
    /// Directory on the target that receives uploaded scripts.
    pub remote_work_dir: String,
    /// Absolute path of the runtime executable on the target.
    pub remote_runtime_path: String,
    /// Local scripts in execution order. Never empty.
    pub scripts: Vec<PathBuf>,
    /// How the runtime gets onto the target.
    pub install_strategy: InstallStrategy,
    /// Bundle scripts locally before upload.
    pub bundle_enabled: bool,
    /// Local bundler executable.
    pub bundler_bin: String,
    /// Upload only, do not run.
    pub skip_execution: bool,
}

/// Resolve `config` into a plan, collecting every violation.
///
/// Script and local binary paths are checked for existence relative to the
/// current directory; nothing is written.
///
/// # Errors
///
/// Returns all configuration violations found, in discovery order.
pub fn resolve(config: &ProvisionConfig) -> Result<ProvisioningPlan, ConfigErrors> {
    let mut errs = Vec::new();

    let remote_work_dir = config
        .remote_folder
        .as_deref()
        .map_or(DEFAULT_REMOTE_FOLDER, str::trim)
        .to_string();
    if remote_work_dir.is_empty() {
        errs.push(ConfigError::EmptyRemoteFolder);
    }

    let install_strategy = install_strategy(config, &mut errs);

    let remote_runtime_path = config
        .remote_runtime_path
        .clone()
        .unwrap_or_else(|| DEFAULT_REMOTE_RUNTIME_PATH.to_string());
    if !is_absolute(&remote_runtime_path) {
        errs.push(ConfigError::RelativeRuntimePath(remote_runtime_path.clone()));
    }

    if config.scripts.is_empty() {
        errs.push(ConfigError::NoScripts);
    }
    for path in &config.scripts {
        if let Err(e) = std::fs::metadata(path) {
            errs.push(ConfigError::MissingScript {
                path: path.clone(),
                reason: e.to_string(),
            });
        }
    }
    check_duplicate_names(&config.scripts, &mut errs);

    if !errs.is_empty() {
        return Err(ConfigErrors(errs));
    }

    Ok(ProvisioningPlan {
        remote_work_dir,
        remote_runtime_path,
        scripts: config.scripts.iter().map(PathBuf::from).collect(),
        install_strategy,
        bundle_enabled: !config.no_bundle,
        bundler_bin: config
            .bundler_bin
            .clone()
            .unwrap_or_else(|| DEFAULT_BUNDLER_BIN.to_string()),
        skip_execution: config.skip_provision,
    })
}

fn install_strategy(config: &ProvisionConfig, errs: &mut Vec<ConfigError>) -> InstallStrategy {
    let local_bin = config
        .local_runtime_bin
        .as_deref()
        .filter(|p| !p.is_empty());

    if let Some(path) = local_bin {
        if let Err(e) = std::fs::metadata(path) {
            errs.push(ConfigError::MissingRuntimeBinary {
                path: path.to_string(),
                reason: e.to_string(),
            });
        }
        if config.skip_install {
            errs.push(ConfigError::SkipInstallWithLocalBinary);
        }
        return InstallStrategy::LocalBinaryUpload {
            local_path: PathBuf::from(path),
        };
    }

    if config.skip_install {
        return InstallStrategy::Skip;
    }

    let version = config
        .target_runtime_version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(v) = version
        && let Err(e) = semver::Version::parse(v.strip_prefix('v').unwrap_or(v))
    {
        errs.push(ConfigError::InvalidVersion {
            version: v.to_string(),
            reason: e.to_string(),
        });
    }
    InstallStrategy::NetworkInstall {
        version: version.map(str::to_owned),
    }
}

fn check_duplicate_names(scripts: &[String], errs: &mut Vec<ConfigError>) {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for path in scripts {
        let Some(name) = base_name(Path::new(path)) else {
            continue;
        };
        if let Some(first) = seen.get(&name) {
            errs.push(ConfigError::DuplicateScriptName {
                first: (*first).to_string(),
                second: path.clone(),
                name,
            });
        } else {
            seen.insert(name, path);
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
