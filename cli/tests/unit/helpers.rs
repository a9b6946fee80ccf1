//! Shared test helpers: recording fakes for the provisioning ports.

#![allow(dead_code, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use deno_provision::application::ports::{
    CommandOutput, CommandRunner, Communicator, ProgressReporter, ScriptBundler,
};
use deno_provision::domain::config::{DEFAULT_BUNDLER_BIN, DEFAULT_REMOTE_RUNTIME_PATH};
use deno_provision::domain::install::InstallStrategy;
use deno_provision::domain::plan::ProvisioningPlan;

// ── Process output constructors ──────────────────────────────────────────────

/// Build an `ExitStatus` from a logical exit code.
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15.
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Shared event log ─────────────────────────────────────────────────────────

/// One port call, in the order it happened across every fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Bundle { source: PathBuf, output: PathBuf },
    Run(String),
    Mkdir(String),
    Upload { path: String, contents: Vec<u8> },
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<Event> {
    log.lock().expect("lock").clone()
}

/// Commands passed to `run_command`, in order.
pub fn commands(log: &EventLog) -> Vec<String> {
    events(log)
        .into_iter()
        .filter_map(|e| match e {
            Event::Run(cmd) => Some(cmd),
            _ => None,
        })
        .collect()
}

/// Destination paths passed to `upload_file`, in order.
pub fn uploads(log: &EventLog) -> Vec<(String, Vec<u8>)> {
    events(log)
        .into_iter()
        .filter_map(|e| match e {
            Event::Upload { path, contents } => Some((path, contents)),
            _ => None,
        })
        .collect()
}

/// Index of the first event matching `pred`.
pub fn position(log: &EventLog, pred: impl Fn(&Event) -> bool) -> Option<usize> {
    events(log).iter().position(pred)
}

// ── Fake communicator ────────────────────────────────────────────────────────

/// Exit-code override for commands containing `needle`.
struct ExitRule {
    needle: String,
    code: i32,
    /// Matches left before the rule expires, `None` for unlimited.
    remaining: Option<usize>,
}

/// Records every call and answers `run_command` from a rule table.
///
/// A command exits 0 unless it contains the needle of a live exit-code rule.
/// The first matching rule wins.
pub struct FakeCommunicator {
    log: EventLog,
    exit_rules: Mutex<Vec<ExitRule>>,
    hang_on: Option<String>,
    fail_uploads_to: Option<String>,
    fail_mkdir: bool,
}

impl FakeCommunicator {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            exit_rules: Mutex::new(Vec::new()),
            hang_on: None,
            fail_uploads_to: None,
            fail_mkdir: false,
        }
    }

    /// Commands containing `needle` exit with `code`.
    #[must_use]
    pub fn exit_code(self, needle: &str, code: i32) -> Self {
        self.push_rule(needle, code, None)
    }

    /// Only the first matching command exits with `code`.
    #[must_use]
    pub fn exit_code_once(self, needle: &str, code: i32) -> Self {
        self.push_rule(needle, code, Some(1))
    }

    fn push_rule(self, needle: &str, code: i32, remaining: Option<usize>) -> Self {
        self.exit_rules.lock().expect("lock").push(ExitRule {
            needle: needle.to_string(),
            code,
            remaining,
        });
        self
    }

    fn exit_code_for(&self, command: &str) -> i32 {
        let mut rules = self.exit_rules.lock().expect("lock");
        let Some(rule) = rules
            .iter_mut()
            .find(|r| r.remaining != Some(0) && command.contains(r.needle.as_str()))
        else {
            return 0;
        };
        if let Some(n) = rule.remaining.as_mut() {
            *n -= 1;
        }
        rule.code
    }

    /// Commands containing `needle` never finish.
    #[must_use]
    pub fn hang_on(mut self, needle: &str) -> Self {
        self.hang_on = Some(needle.to_string());
        self
    }

    /// Uploads whose path contains `needle` fail at the channel level.
    #[must_use]
    pub fn fail_uploads_to(mut self, needle: &str) -> Self {
        self.fail_uploads_to = Some(needle.to_string());
        self
    }

    #[must_use]
    pub fn fail_mkdir(mut self) -> Self {
        self.fail_mkdir = true;
        self
    }

    fn record(&self, event: Event) {
        self.log.lock().expect("lock").push(event);
    }
}

impl Communicator for FakeCommunicator {
    async fn run_command(&self, command: &str) -> Result<CommandOutput> {
        self.record(Event::Run(command.to_string()));
        if let Some(needle) = &self.hang_on
            && command.contains(needle.as_str())
        {
            std::future::pending::<()>().await;
        }
        Ok(CommandOutput {
            code: self.exit_code_for(command),
            output: String::new(),
        })
    }

    async fn upload_file(&self, remote_path: &str, contents: &[u8]) -> Result<()> {
        self.record(Event::Upload {
            path: remote_path.to_string(),
            contents: contents.to_vec(),
        });
        if let Some(needle) = &self.fail_uploads_to
            && remote_path.contains(needle.as_str())
        {
            anyhow::bail!("connection reset while writing {remote_path}");
        }
        Ok(())
    }

    async fn create_directory(&self, remote_path: &str) -> Result<()> {
        self.record(Event::Mkdir(remote_path.to_string()));
        if self.fail_mkdir {
            anyhow::bail!("permission denied");
        }
        Ok(())
    }
}

// ── Fake bundler ─────────────────────────────────────────────────────────────

/// Header the fake bundler prepends to every output.
pub const BUNDLE_HEADER: &[u8] = b"// bundled\n";

/// Writes `BUNDLE_HEADER` followed by the source bytes to the output path.
pub struct RecordingBundler {
    log: EventLog,
    fail_on: Option<String>,
    write_output: bool,
}

impl RecordingBundler {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_on: None,
            write_output: true,
        }
    }

    /// Sources whose path contains `needle` fail to bundle.
    #[must_use]
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Report success without writing anything.
    #[must_use]
    pub fn without_output(mut self) -> Self {
        self.write_output = false;
        self
    }
}

impl ScriptBundler for RecordingBundler {
    async fn bundle(&self, source: &Path, output: &Path) -> Result<()> {
        self.log.lock().expect("lock").push(Event::Bundle {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
        });
        if let Some(needle) = &self.fail_on
            && source.to_string_lossy().contains(needle.as_str())
        {
            anyhow::bail!("bundle exited with status 1: syntax error");
        }
        if self.write_output {
            let mut bytes = BUNDLE_HEADER.to_vec();
            bytes.extend(std::fs::read(source)?);
            std::fs::write(output, bytes)?;
        }
        Ok(())
    }
}

// ── Recording reporter ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self, kind: &str) -> Vec<String> {
        self.messages
            .lock()
            .expect("lock")
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, kind: &'static str, message: &str) {
        self.messages
            .lock()
            .expect("lock")
            .push((kind, message.to_string()));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

// ── Mock command runner ──────────────────────────────────────────────────────

/// A recorded `CommandRunner` call: program, args, and stdin if any.
pub type RunnerCall = (String, Vec<String>, Option<Vec<u8>>);

/// Records every invocation and replies with a fixed output.
pub struct MockCommandRunner {
    pub calls: Arc<Mutex<Vec<RunnerCall>>>,
    code: i32,
    stderr: Vec<u8>,
}

impl MockCommandRunner {
    pub fn ok() -> Self {
        Self::with_output(0, b"")
    }

    pub fn with_output(code: i32, stderr: &[u8]) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            code,
            stderr: stderr.to_vec(),
        }
    }

    fn reply(&self, program: &str, args: &[&str], stdin: Option<&[u8]>) -> Output {
        self.calls.lock().expect("lock").push((
            program.to_string(),
            args.iter().map(ToString::to_string).collect(),
            stdin.map(<[u8]>::to_vec),
        ));
        if self.code == 0 {
            ok_output(b"")
        } else {
            err_output(self.code, &self.stderr)
        }
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        Ok(self.reply(program, args, None))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        _timeout: std::time::Duration,
    ) -> Result<Output> {
        Ok(self.reply(program, args, None))
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], stdin: &[u8]) -> Result<Output> {
        Ok(self.reply(program, args, Some(stdin)))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Write `contents` to `dir/name` and return its path.
pub fn write_script(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create script dir");
    }
    std::fs::write(&path, contents).expect("write script");
    path
}

/// Create a named pipe at `dir/name` and return its path.
pub fn make_fifo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let status = std::process::Command::new("mkfifo")
        .arg(&path)
        .status()
        .expect("spawn mkfifo");
    assert!(status.success(), "mkfifo {} failed", path.display());
    path
}

/// Plan that skips install and uploads `scripts` as-is to `/opt/work`.
pub fn plan(scripts: Vec<PathBuf>) -> ProvisioningPlan {
    ProvisioningPlan {
        remote_work_dir: "/opt/work".to_string(),
        remote_runtime_path: DEFAULT_REMOTE_RUNTIME_PATH.to_string(),
        scripts,
        install_strategy: InstallStrategy::Skip,
        bundle_enabled: false,
        bundler_bin: DEFAULT_BUNDLER_BIN.to_string(),
        skip_execution: false,
    }
}
