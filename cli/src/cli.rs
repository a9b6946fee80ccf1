//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::output::{OutputContext, json};

/// Install Deno on a machine and run provisioning scripts with it
#[derive(Parser)]
#[command(
    name = "deno-provision",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Bundle, upload and run the configured scripts on a target
    Run(commands::run::RunArgs),

    /// Check the configuration and print the resolved plan
    Validate(commands::validate::ValidateArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// In JSON mode progress output is suppressed so stdout carries a single
    /// JSON document, and command errors are printed as a JSON error object.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before it can report on its own.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        let ctx = OutputContext::new(no_color, quiet || json);

        let result = match command {
            Command::Version => commands::version::run(json).map(|()| ExitCode::SUCCESS),
            Command::Run(args) => commands::run::run(&ctx, &args, json).await,
            Command::Validate(args) => commands::validate::run(&ctx, &args, json),
        };

        match result {
            Err(e) if json => {
                println!("{}", json::format_error(&format!("{e:#}"), "COMMAND_FAILED", &[])?);
                Ok(ExitCode::FAILURE)
            }
            other => other,
        }
    }
}
