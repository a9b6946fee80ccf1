//! Command implementations

pub mod run;
pub mod validate;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::application::ports::ConfigStore;
use crate::domain::config::ProvisionConfig;
use crate::domain::error::ConfigErrors;
use crate::output::OutputContext;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Config file selection and per-key overrides shared by `run` and `validate`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Config file (default: ./provision.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Script to provision; repeat to run several in order (replaces `scripts`)
    #[arg(short, long = "script", value_name = "PATH")]
    pub scripts: Vec<String>,

    /// Upload this local Deno binary instead of running the installer
    #[arg(long, value_name = "PATH")]
    pub local_runtime_bin: Option<String>,

    /// Assume Deno is already installed on the target
    #[arg(long)]
    pub skip_install: bool,

    /// Remote folder that receives the scripts
    #[arg(long, value_name = "DIR")]
    pub remote_folder: Option<String>,

    /// Upload scripts without running them
    #[arg(long)]
    pub skip_provision: bool,

    /// Deno version tag for the installer, e.g. v1.5.0
    #[arg(long = "runtime-version", value_name = "TAG")]
    pub target_runtime_version: Option<String>,

    /// Upload scripts as-is instead of bundling them
    #[arg(long)]
    pub no_bundle: bool,

    /// Local bundler executable
    #[arg(long, value_name = "BIN")]
    pub bundler_bin: Option<String>,

    /// Path of the Deno executable on the target
    #[arg(long, value_name = "PATH")]
    pub remote_runtime_path: Option<String>,

    /// Timeout for each remote command, in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub command_timeout_secs: Option<u64>,
}

impl ConfigArgs {
    /// The flags as a config layer to merge over the file.
    #[must_use]
    pub fn overrides(&self) -> ProvisionConfig {
        ProvisionConfig {
            local_runtime_bin: self.local_runtime_bin.clone(),
            skip_install: self.skip_install,
            remote_folder: self.remote_folder.clone(),
            scripts: self.scripts.clone(),
            skip_provision: self.skip_provision,
            target_runtime_version: self.target_runtime_version.clone(),
            no_bundle: self.no_bundle,
            bundler_bin: self.bundler_bin.clone(),
            remote_runtime_path: self.remote_runtime_path.clone(),
            command_timeout_secs: self.command_timeout_secs,
        }
    }
}

/// Load the raw config from `store` and apply the flag overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore, args: &ConfigArgs) -> Result<ProvisionConfig> {
    let base = store.load()?;
    tracing::debug!(path = %store.path().display(), "config loaded");
    Ok(base.merge(args.overrides()))
}

/// Print every configuration violation in the selected format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn print_config_errors(ctx: &OutputContext, errors: &ConfigErrors, json: bool) -> Result<()> {
    if json {
        let details: Vec<String> = errors.errors().iter().map(ToString::to_string).collect();
        let message = format!("{} configuration error(s)", details.len());
        println!("{}", json::format_error(&message, "CONFIG_INVALID", &details)?);
    } else {
        HumanRenderer::new(ctx).render_config_errors(errors);
    }
    Ok(())
}
