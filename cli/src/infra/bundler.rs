//! Infrastructure implementation of the `ScriptBundler` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandOutput, CommandRunner, ScriptBundler};

/// Bundles scripts by running `<bin> bundle <source> <output>` locally.
pub struct DenoBundler<R: CommandRunner> {
    runner: R,
    bin: String,
}

impl<R: CommandRunner> DenoBundler<R> {
    pub fn new(runner: R, bin: impl Into<String>) -> Self {
        Self {
            runner,
            bin: bin.into(),
        }
    }
}

impl<R: CommandRunner> ScriptBundler for DenoBundler<R> {
    async fn bundle(&self, source: &Path, output: &Path) -> Result<()> {
        let src = source.to_string_lossy();
        let out = output.to_string_lossy();
        tracing::debug!(bin = %self.bin, source = %src, output = %out, "bundling");

        let result = self
            .runner
            .run(&self.bin, &["bundle", src.as_ref(), out.as_ref()])
            .await
            .with_context(|| format!("running {} bundle", self.bin))?;
        if !result.status.success() {
            let out = CommandOutput::from_process(&result);
            anyhow::bail!(
                "{} bundle exited with status {}: {}",
                self.bin,
                out.code,
                out.output.trim()
            );
        }
        Ok(())
    }
}
