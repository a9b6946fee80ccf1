//! Install phase: get the runtime onto the target using exactly one strategy.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::{cancellable, run_checked, run_probe};
use crate::application::ports::{CommandOutput, Communicator, ProgressReporter};
use crate::domain::error::{Phase, ProvisionError, RemoteError};
use crate::domain::install::{
    DOWNLOADER, InstallStrategy, OS_PROBE, PACKAGE_MANAGERS, PackageManager, bootstrap_command,
    chmod_command, probe_command,
};
use crate::domain::plan::ProvisioningPlan;
use crate::domain::remote::remote_parent;

/// What the install phase did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InstallOutcome {
    Skipped,
    NetworkInstalled { version: Option<String> },
    BinaryUploaded { remote_path: String },
}

/// Install the runtime according to `plan.install_strategy`.
///
/// # Errors
///
/// Any failing remote operation aborts the phase with
/// [`ProvisionError::Install`]; nothing is retried.
pub async fn install_runtime(
    plan: &ProvisioningPlan,
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<InstallOutcome, ProvisionError> {
    match &plan.install_strategy {
        InstallStrategy::Skip => {
            reporter.step("skipping deno installation");
            Ok(InstallOutcome::Skipped)
        }
        InstallStrategy::NetworkInstall { version } => {
            network_install(version.as_deref(), comm, reporter, cancel).await?;
            reporter.success("deno installed");
            Ok(InstallOutcome::NetworkInstalled {
                version: version.clone(),
            })
        }
        InstallStrategy::LocalBinaryUpload { local_path } => {
            upload_binary(local_path, &plan.remote_runtime_path, comm, reporter, cancel).await?;
            reporter.success(&format!("deno uploaded to {}", plan.remote_runtime_path));
            Ok(InstallOutcome::BinaryUploaded {
                remote_path: plan.remote_runtime_path.clone(),
            })
        }
    }
}

async fn network_install(
    version: Option<&str>,
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(), ProvisionError> {
    log_remote_os(comm, cancel).await?;
    ensure_downloader(comm, reporter, cancel).await?;

    reporter.step("downloading and executing deno installer script");
    run(comm, cancel, &bootstrap_command(version)).await?;
    Ok(())
}

/// OS detection is informational only; its failure never aborts.
async fn log_remote_os(
    comm: &impl Communicator,
    cancel: &CancellationToken,
) -> Result<(), ProvisionError> {
    match cancellable(cancel, Phase::Install, comm.run_command(OS_PROBE)).await? {
        Ok(out) if out.success() => {
            tracing::info!(os = %out.output.trim(), "remote OS detected");
        }
        Ok(out) => tracing::debug!(code = out.code, "remote OS probe failed"),
        Err(e) => tracing::debug!(error = %e, "remote OS probe failed"),
    }
    Ok(())
}

async fn ensure_downloader(
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(), ProvisionError> {
    let probe_downloader = probe_command(DOWNLOADER);
    if probe(comm, cancel, &probe_downloader).await? {
        tracing::debug!(tool = DOWNLOADER, "downloader already present");
        return Ok(());
    }

    reporter.step(&format!("{DOWNLOADER} not detected, installing it"));
    let pm = select_package_manager(comm, cancel).await?;
    reporter.step(&format!("using {}", pm.name));
    run(comm, cancel, pm.install).await?;

    if !probe(comm, cancel, &probe_downloader).await? {
        return Err(ProvisionError::Install(RemoteError::DownloaderUnavailable {
            tool: DOWNLOADER.to_string(),
        }));
    }
    Ok(())
}

/// First package manager whose `command -v` probe succeeds.
async fn select_package_manager(
    comm: &impl Communicator,
    cancel: &CancellationToken,
) -> Result<&'static PackageManager, ProvisionError> {
    for pm in PACKAGE_MANAGERS {
        if probe(comm, cancel, &probe_command(pm.name)).await? {
            return Ok(pm);
        }
    }
    let tried = PACKAGE_MANAGERS
        .iter()
        .map(|pm| pm.name)
        .collect::<Vec<_>>()
        .join(", ");
    Err(ProvisionError::Install(RemoteError::NoPackageManager {
        tried,
    }))
}

async fn upload_binary(
    local_path: &Path,
    remote_path: &str,
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(), ProvisionError> {
    let parent = remote_parent(remote_path);
    reporter.step(&format!("creating directory: {parent}"));
    cancellable(cancel, Phase::Install, comm.create_directory(&parent))
        .await?
        .map_err(|source| {
            ProvisionError::Install(RemoteError::Channel {
                command: format!("mkdir -p {parent}"),
                source,
            })
        })?;

    reporter.step(&format!("uploading {}", local_path.display()));
    let contents = cancellable(cancel, Phase::Install, tokio::fs::read(local_path))
        .await?
        .map_err(|e| {
            ProvisionError::Install(RemoteError::Channel {
                command: format!("upload {remote_path}"),
                source: anyhow::Error::new(e)
                    .context(format!("reading {}", local_path.display())),
            })
        })?;
    cancellable(cancel, Phase::Install, comm.upload_file(remote_path, &contents))
        .await?
        .map_err(|source| {
            ProvisionError::Install(RemoteError::Channel {
                command: format!("upload {remote_path}"),
                source,
            })
        })?;

    run(comm, cancel, &chmod_command(remote_path)).await?;
    Ok(())
}

async fn probe(
    comm: &impl Communicator,
    cancel: &CancellationToken,
    command: &str,
) -> Result<bool, ProvisionError> {
    cancellable(cancel, Phase::Install, run_probe(comm, command))
        .await?
        .map_err(ProvisionError::Install)
}

async fn run(
    comm: &impl Communicator,
    cancel: &CancellationToken,
    command: &str,
) -> Result<CommandOutput, ProvisionError> {
    cancellable(cancel, Phase::Install, run_checked(comm, command))
        .await?
        .map_err(ProvisionError::Install)
}
