//! Application service for one provisioning run.
//!
//! `run_provision` drives the phases strictly in order:
//! bundle → install → create remote dir → upload → execute.
//! The first failure ends the run; nothing is retried.

mod bundle;
mod execute;
mod install;
mod upload;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{CommandOutput, Communicator, ProgressReporter, ScriptBundler};
use crate::domain::error::{Phase, ProvisionError, RemoteError};
use crate::domain::plan::ProvisioningPlan;

pub use bundle::{Artifact, ArtifactSet, bundle_scripts};
pub use execute::execute_scripts;
pub use install::{InstallOutcome, install_runtime};
pub use upload::{ManifestEntry, create_remote_dir, upload_artifacts};

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// What the installer phase did.
    pub install: InstallOutcome,
    /// Uploaded artifacts in execution order.
    pub manifest: Vec<ManifestEntry>,
    /// Remote paths that were executed, in order.
    pub executed: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Run one provisioning pass of `plan` against the target behind `comm`.
///
/// On failure the reporter receives a final message naming the phase before
/// the error is returned. Cancelling `cancel` aborts whatever wait is in
/// flight and yields [`ProvisionError::Cancelled`].
///
/// # Errors
///
/// Returns the first phase failure; later phases never run.
pub async fn run_provision(
    plan: &ProvisioningPlan,
    comm: &impl Communicator,
    bundler: &impl ScriptBundler,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<RunReport, ProvisionError> {
    let started_at = Utc::now();
    tracing::info!(
        scripts = plan.scripts.len(),
        install = %plan.install_strategy.describe(),
        remote_dir = %plan.remote_work_dir,
        "provisioning run started"
    );

    let result = run_phases(plan, comm, bundler, reporter, cancel).await;

    match result {
        Ok((install, manifest, executed)) => {
            tracing::info!(executed = executed.len(), "provisioning run finished");
            Ok(RunReport {
                install,
                manifest,
                executed,
                started_at,
                finished_at: Utc::now(),
            })
        }
        Err(e) => {
            tracing::error!(phase = %e.phase(), error = %e, "provisioning run failed");
            reporter.error(&format!("{} phase failed: {e}", e.phase()));
            Err(e)
        }
    }
}

async fn run_phases(
    plan: &ProvisioningPlan,
    comm: &impl Communicator,
    bundler: &impl ScriptBundler,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(InstallOutcome, Vec<ManifestEntry>, Vec<String>), ProvisionError> {
    // The staging directory lives until the end of this function.
    let artifacts = bundle_scripts(plan, bundler, reporter, cancel).await?;
    let install = install_runtime(plan, comm, reporter, cancel).await?;
    create_remote_dir(plan, comm, reporter, cancel).await?;
    let manifest = upload_artifacts(plan, &artifacts, comm, reporter, cancel).await?;
    let executed = execute_scripts(plan, &manifest, comm, reporter, cancel).await?;
    Ok((install, manifest, executed))
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Await `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T>(
    cancel: &CancellationToken,
    phase: Phase,
    fut: impl Future<Output = T>,
) -> Result<T, ProvisionError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            tracing::warn!(%phase, "cancellation requested");
            Err(ProvisionError::Cancelled { phase })
        }
        out = fut => Ok(out),
    }
}

/// Run `command` and require exit status 0.
pub(crate) async fn run_checked(
    comm: &impl Communicator,
    command: &str,
) -> Result<CommandOutput, RemoteError> {
    tracing::debug!(command, "running remote command");
    let out = comm
        .run_command(command)
        .await
        .map_err(|source| RemoteError::Channel {
            command: command.to_string(),
            source,
        })?;
    tracing::debug!(command, code = out.code, "remote command finished");
    if !out.success() {
        tracing::debug!(output = %out.output.trim_end(), "remote command output");
        return Err(RemoteError::NonZeroExit {
            command: command.to_string(),
            code: out.code,
        });
    }
    Ok(out)
}

/// Run a probe command; `true` when it exits 0.
pub(crate) async fn run_probe(comm: &impl Communicator, command: &str) -> Result<bool, RemoteError> {
    tracing::debug!(command, "probing remote");
    comm.run_command(command)
        .await
        .map(|out| out.success())
        .map_err(|source| RemoteError::Channel {
            command: command.to_string(),
            source,
        })
}
