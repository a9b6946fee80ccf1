//! Run command: one provisioning pass against a target.

use std::error::Error as _;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;

use super::{ConfigArgs, load_config, print_config_errors};
use crate::application::services::provision::run_provision;
use crate::domain::error::ProvisionError;
use crate::domain::plan::resolve;
use crate::domain::target::Target;
use crate::infra::bundler::DenoBundler;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::communicator::ShellCommunicator;
use crate::infra::config::YamlConfigStore;
use crate::output::human::HumanRenderer;
use crate::output::{OutputContext, TerminalReporter, json};

/// Exit status after Ctrl-C, as shells report SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Machine to provision: local, multipass:<instance> or ssh:<destination>
    #[arg(short, long, default_value = "local", env = "DENO_PROVISION_TARGET")]
    pub target: Target,
}

/// Entry point for `deno-provision run`.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded. Configuration and
/// provisioning failures are reported here and turned into the exit code.
pub async fn run(ctx: &OutputContext, args: &RunArgs, json: bool) -> Result<ExitCode> {
    let store = YamlConfigStore::new(args.config.config.clone());
    let config = load_config(&store, &args.config)?;
    let plan = match resolve(&config) {
        Ok(plan) => plan,
        Err(errors) => {
            print_config_errors(ctx, &errors, json)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let timeout = Duration::from_secs(config.command_timeout_secs());
    let comm = ShellCommunicator::new(TokioCommandRunner::new(timeout), args.target.clone());
    let bundler = DenoBundler::new(TokioCommandRunner::new(timeout), plan.bundler_bin.clone());
    let reporter = TerminalReporter::new(ctx);

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling run");
                cancel.cancel();
            }
        }
    });

    ctx.info(&format!("provisioning {}", args.target));
    let result = run_provision(&plan, &comm, &bundler, &reporter, &cancel).await;
    interrupt.abort();

    match result {
        Ok(report) => {
            if json {
                println!("{}", json::format_value(&report)?);
            } else {
                HumanRenderer::new(ctx).render_report(&report);
                ctx.success("provisioning complete");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if json {
                println!("{}", json::format_error(&e.to_string(), e.code(), &causes(&e))?);
            }
            if e.is_cancelled() {
                Ok(ExitCode::from(EXIT_INTERRUPTED))
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

/// Messages of every underlying cause, outermost first.
fn causes(e: &ProvisionError) -> Vec<String> {
    std::iter::successors(e.source(), |s| (*s).source())
        .map(ToString::to_string)
        .collect()
}
