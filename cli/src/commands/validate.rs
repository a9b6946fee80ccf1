//! Validate command: resolve the plan without touching any target.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::{ConfigArgs, load_config, print_config_errors};
use crate::domain::plan::resolve;
use crate::infra::config::YamlConfigStore;
use crate::output::human::HumanRenderer;
use crate::output::{OutputContext, json};

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Entry point for `deno-provision validate`.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded.
pub fn run(ctx: &OutputContext, args: &ValidateArgs, json: bool) -> Result<ExitCode> {
    let store = YamlConfigStore::new(args.config.config.clone());
    let config = load_config(&store, &args.config)?;

    match resolve(&config) {
        Ok(plan) => {
            if json {
                println!("{}", json::format_value(&plan)?);
            } else {
                HumanRenderer::new(ctx).render_plan(&plan);
                ctx.success("configuration is valid");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            print_config_errors(ctx, &errors, json)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
