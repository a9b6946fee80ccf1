//! Upload phase: create the remote work directory and transfer every artifact.

use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use super::{ArtifactSet, cancellable};
use crate::application::ports::{Communicator, ProgressReporter};
use crate::domain::error::{Phase, ProvisionError, RemoteError};
use crate::domain::plan::ProvisioningPlan;
use crate::domain::remote::{base_name, remote_join};

/// One successfully uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Script path as configured.
    pub script: PathBuf,
    /// Destination on the target.
    pub remote_path: String,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
}

/// Create `plan.remote_work_dir` on the target. Tolerates an existing directory.
///
/// # Errors
///
/// Returns [`ProvisionError::RemoteDir`] if the channel reports a failure.
pub async fn create_remote_dir(
    plan: &ProvisioningPlan,
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<(), ProvisionError> {
    let dir = &plan.remote_work_dir;
    reporter.step(&format!("creating directory: {dir}"));
    cancellable(cancel, Phase::Upload, comm.create_directory(dir))
        .await?
        .map_err(|source| ProvisionError::RemoteDir {
            dir: dir.clone(),
            source: RemoteError::Channel {
                command: format!("mkdir -p {dir}"),
                source,
            },
        })
}

/// Upload every artifact under `plan.remote_work_dir`, in order.
///
/// Directories abort the run. Other non-regular files (pipes, sockets,
/// devices) are reported and skipped, and get no manifest entry.
///
/// # Errors
///
/// Returns the first transfer failure or [`ProvisionError::DirectoryScript`].
pub async fn upload_artifacts(
    plan: &ProvisioningPlan,
    artifacts: &ArtifactSet,
    comm: &impl Communicator,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<Vec<ManifestEntry>, ProvisionError> {
    reporter.step("uploading deno scripts...");
    let mut manifest = Vec::with_capacity(artifacts.len());

    for artifact in artifacts.iter() {
        let local = &artifact.local;
        let name = base_name(local).unwrap_or_default();
        let remote = remote_join(&plan.remote_work_dir, &name);
        let upload_err = |source: anyhow::Error| ProvisionError::Upload {
            local: local.clone(),
            remote: remote.clone(),
            source,
        };

        let meta = tokio::fs::metadata(local)
            .await
            .map_err(|e| upload_err(anyhow::Error::new(e).context("stat error")))?;
        let file_type = meta.file_type();

        if file_type.is_dir() {
            return Err(ProvisionError::DirectoryScript(local.clone()));
        }
        if !file_type.is_file() {
            tracing::warn!(path = %local.display(), "skipping script that is not a regular file");
            reporter.warn(&format!("{} is not a regular file, skipping", local.display()));
            continue;
        }

        reporter.step(&format!("uploading {}", local.display()));
        let contents = cancellable(cancel, Phase::Upload, tokio::fs::read(local))
            .await?
            .map_err(|e| upload_err(anyhow::Error::new(e).context("error opening")))?;
        cancellable(cancel, Phase::Upload, comm.upload_file(&remote, &contents))
            .await?
            .map_err(upload_err)?;
        tracing::debug!(local = %local.display(), %remote, bytes = contents.len(), "uploaded");

        manifest.push(ManifestEntry {
            script: artifact.script.clone(),
            remote_path: remote,
            sha256: format!("{:x}", Sha256::digest(&contents)),
        });
    }

    reporter.success(&format!("uploaded {} script(s)", manifest.len()));
    Ok(manifest)
}
