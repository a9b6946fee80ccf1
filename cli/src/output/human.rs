//! Human-readable terminal renderer.

use crate::application::services::provision::{InstallOutcome, RunReport};
use crate::domain::error::ConfigErrors;
use crate::domain::plan::ProvisioningPlan;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render a resolved plan.
    pub fn render_plan(&self, plan: &ProvisioningPlan) {
        self.ctx.header("Provisioning plan:");
        self.ctx.kv("Install:      ", &plan.install_strategy.describe());
        self.ctx.kv("Runtime path: ", &plan.remote_runtime_path);
        self.ctx.kv("Remote folder:", &plan.remote_work_dir);
        let bundle = if plan.bundle_enabled {
            format!("yes ({})", plan.bundler_bin)
        } else {
            "no".to_string()
        };
        self.ctx.kv("Bundle:       ", &bundle);
        self.ctx.kv("Execute:      ", if plan.skip_execution { "no" } else { "yes" });
        self.ctx.header("Scripts:");
        for (i, script) in plan.scripts.iter().enumerate() {
            self.ctx.kv(&format!("{:>3}.", i + 1), &script.display().to_string());
        }
    }

    /// Render the summary of a finished run.
    pub fn render_report(&self, report: &RunReport) {
        let install = match &report.install {
            InstallOutcome::Skipped => "skipped".to_string(),
            InstallOutcome::NetworkInstalled { version: None } => "installed latest".to_string(),
            InstallOutcome::NetworkInstalled { version: Some(v) } => format!("installed {v}"),
            InstallOutcome::BinaryUploaded { remote_path } => format!("uploaded to {remote_path}"),
        };
        let ms = (report.finished_at - report.started_at).num_milliseconds().max(0);

        self.ctx.header("Summary:");
        self.ctx.kv("Runtime: ", &install);
        self.ctx.kv("Uploaded:", &report.manifest.len().to_string());
        self.ctx.kv("Executed:", &report.executed.len().to_string());
        self.ctx
            .kv("Duration:", &format!("{}.{}s", ms / 1000, (ms % 1000) / 100));
    }

    /// Render every configuration violation. Never suppressed.
    pub fn render_config_errors(&self, errors: &ConfigErrors) {
        self.ctx
            .error(&format!("{} configuration error(s):", errors.errors().len()));
        for err in errors.errors() {
            eprintln!("      * {err}");
        }
    }
}
