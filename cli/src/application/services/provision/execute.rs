//! Execute phase: run uploaded scripts in manifest order.

use tokio_util::sync::CancellationToken;

use super::{ManifestEntry, cancellable, run_checked};
use crate::application::ports::{Communicator, ProgressReporter};
use crate::domain::error::{Phase, ProvisionError};
use crate::domain::install::run_script_command;
use crate::domain::plan::ProvisioningPlan;

/// Run every manifest entry with the remote runtime, stopping at the first
/// non-zero exit. Returns the executed remote paths.
///
/// # Errors
///
/// Returns [`ProvisionError::Execution`] for the first failing script.
pub async fn execute_scripts(
    plan: &ProvisioningPlan,
    manifest: &[ManifestEntry],
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ProvisionError> {
    if plan.skip_execution {
        tracing::info!(uploaded = manifest.len(), "skip_provision set, not running scripts");
        reporter.step("skipping provisioning scripts");
        return Ok(Vec::new());
    }

    reporter.step("running provisioning scripts");
    let mut executed = Vec::with_capacity(manifest.len());
    for entry in manifest {
        let command = run_script_command(&plan.remote_runtime_path, &entry.remote_path);
        reporter.step(&command);
        cancellable(cancel, Phase::Execute, run_checked(comm, &command))
            .await?
            .map_err(|source| ProvisionError::Execution {
                script: entry.remote_path.clone(),
                source,
            })?;
        executed.push(entry.remote_path.clone());
    }
    reporter.success(&format!("ran {} script(s)", executed.len()));
    Ok(executed)
}
