//! Bundle phase: turn each configured script into an uploadable artifact.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::cancellable;
use crate::application::ports::{ProgressReporter, ScriptBundler};
use crate::domain::error::{Phase, ProvisionError};
use crate::domain::plan::ProvisioningPlan;
use crate::domain::remote::base_name;

/// One configured script and the local file that will be uploaded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Script path as configured.
    pub script: PathBuf,
    /// File to upload. Equal to `script` when bundling is disabled.
    pub local: PathBuf,
}

/// Artifacts of one run in configured order.
///
/// Owns the run's staging directory, which is removed on drop.
#[derive(Debug)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
    staging: Option<TempDir>,
}

impl ArtifactSet {
    /// Artifacts that map every script to itself.
    #[must_use]
    pub fn identity(scripts: &[PathBuf]) -> Self {
        Self {
            artifacts: scripts
                .iter()
                .map(|s| Artifact {
                    script: s.clone(),
                    local: s.clone(),
                })
                .collect(),
            staging: None,
        }
    }

    /// Iterate the artifacts in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// The staging directory holding bundle outputs, if bundling ran.
    #[must_use]
    pub fn staging_dir(&self) -> Option<&Path> {
        self.staging.as_ref().map(TempDir::path)
    }
}

/// Bundle every script of `plan` in order.
///
/// Outputs go to `<per-run temp dir>/<script file name>`, so the uploaded
/// file keeps the script's name. Stops at the first failure.
///
/// Scripts are classified before the bundler sees them: a directory aborts
/// the run, any other non-regular file (pipe, socket, device) is reported
/// and left out of the set, so it is never bundled, uploaded or executed.
///
/// # Errors
///
/// Returns [`ProvisionError::Bundle`] naming the failing script,
/// [`ProvisionError::DirectoryScript`] for a directory, or
/// [`ProvisionError::Staging`] if the temp directory cannot be created.
pub async fn bundle_scripts(
    plan: &ProvisioningPlan,
    bundler: &impl ScriptBundler,
    reporter: &impl ProgressReporter,
    cancel: &CancellationToken,
) -> Result<ArtifactSet, ProvisionError> {
    if !plan.bundle_enabled {
        tracing::debug!("bundling disabled, uploading scripts as-is");
        return Ok(ArtifactSet::identity(&plan.scripts));
    }

    reporter.step("bundling scripts locally before upload");
    let staging = tempfile::Builder::new()
        .prefix("deno-provision-")
        .tempdir()
        .map_err(ProvisionError::Staging)?;

    let mut artifacts = Vec::with_capacity(plan.scripts.len());
    for script in &plan.scripts {
        let name = base_name(script).ok_or_else(|| ProvisionError::Bundle {
            script: script.clone(),
            source: anyhow::anyhow!("script path has no file name"),
        })?;
        let output = staging.path().join(name);

        // stat only; a FIFO must never be opened here.
        let file_type = tokio::fs::metadata(script)
            .await
            .map_err(|e| ProvisionError::Bundle {
                script: script.clone(),
                source: anyhow::Error::new(e).context("stat error"),
            })?
            .file_type();
        if file_type.is_dir() {
            return Err(ProvisionError::DirectoryScript(script.clone()));
        }
        if !file_type.is_file() {
            tracing::warn!(path = %script.display(), "skipping script that is not a regular file");
            reporter.warn(&format!("{} is not a regular file, skipping", script.display()));
            continue;
        }

        reporter.step(&format!("bundling {}", script.display()));
        cancellable(cancel, Phase::Bundle, bundler.bundle(script, &output))
            .await?
            .map_err(|source| ProvisionError::Bundle {
                script: script.clone(),
                source,
            })?;

        let produced = tokio::fs::metadata(&output)
            .await
            .is_ok_and(|meta| meta.is_file());
        if !produced {
            return Err(ProvisionError::Bundle {
                script: script.clone(),
                source: anyhow::anyhow!("bundler left no file at {}", output.display()),
            });
        }
        tracing::debug!(script = %script.display(), bundle = %output.display(), "bundle written");

        artifacts.push(Artifact {
            script: script.clone(),
            local: output,
        });
    }
    reporter.success(&format!("bundled {} script(s)", artifacts.len()));

    Ok(ArtifactSet {
        artifacts,
        staging: Some(staging),
    })
}
