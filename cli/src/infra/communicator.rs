//! Infrastructure implementation of the `Communicator` port.
//!
//! `ShellCommunicator<R>` reaches the target through a local program
//! (`sh`, `multipass` or `ssh`) and routes every call through a
//! `CommandRunner`. Uploads pipe the file bytes into `cat > <path>` on the
//! target, so no transfer tool beyond a POSIX shell is needed there.

use anyhow::{Context, Result};

use crate::application::ports::{CommandOutput, CommandRunner, Communicator};
use crate::domain::remote::shell_quote;
use crate::domain::target::Target;

/// Communicator for any [`Target`], generic over the process runner so tests
/// can inject a recording mock.
pub struct ShellCommunicator<R: CommandRunner> {
    runner: R,
    target: Target,
}

impl<R: CommandRunner> ShellCommunicator<R> {
    pub fn new(runner: R, target: Target) -> Self {
        Self { runner, target }
    }

    /// Program and arguments that run `command` through a shell on the target.
    pub fn shell_argv<'a>(&'a self, command: &'a str) -> (&'static str, Vec<&'a str>) {
        match &self.target {
            Target::Local => ("sh", vec!["-c", command]),
            Target::Multipass { instance } => (
                "multipass",
                vec!["exec", instance.as_str(), "--", "sh", "-c", command],
            ),
            // ssh hands the remaining argument to the remote login shell.
            Target::Ssh { destination } => (
                "ssh",
                vec!["-o", "BatchMode=yes", destination.as_str(), "--", command],
            ),
        }
    }
}

impl<R: CommandRunner> Communicator for ShellCommunicator<R> {
    async fn run_command(&self, command: &str) -> Result<CommandOutput> {
        let (program, args) = self.shell_argv(command);
        let output = self
            .runner
            .run(program, &args)
            .await
            .with_context(|| format!("{program} ({})", self.target))?;
        Ok(CommandOutput::from_process(&output))
    }

    async fn upload_file(&self, remote_path: &str, contents: &[u8]) -> Result<()> {
        let command = format!("cat > {}", shell_quote(remote_path));
        let (program, args) = self.shell_argv(&command);
        let output = self
            .runner
            .run_with_stdin(program, &args, contents)
            .await
            .with_context(|| format!("upload to {remote_path} ({})", self.target))?;
        if !output.status.success() {
            let out = CommandOutput::from_process(&output);
            anyhow::bail!(
                "upload to {remote_path} exited with status {}: {}",
                out.code,
                out.output.trim()
            );
        }
        Ok(())
    }

    async fn create_directory(&self, remote_path: &str) -> Result<()> {
        let command = format!("mkdir -p {}", shell_quote(remote_path));
        let out = self.run_command(&command).await?;
        if !out.success() {
            anyhow::bail!(
                "create dir non-zero exit status: {} ({})",
                out.code,
                out.output.trim()
            );
        }
        Ok(())
    }
}
