//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Provision the Nightwatch monitoring agent on deployment hosts
#[derive(Parser)]
#[command(
    name = "nightwatch-deploy",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Inventory file [default: ./deploy.yaml]
    #[arg(long, global = true, value_name = "PATH", env = "NIGHTWATCH_DEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Limit the run to this host alias (repeatable)
    #[arg(long = "host", global = true, value_name = "ALIAS")]
    pub hosts: Vec<String>,

    /// Answer prompts with their defaults
    #[arg(short = 'y', long, global = true, env = "NIGHTWATCH_DEPLOY_YES")]
    pub yes: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install the Nightwatch agent under supervisor
    Setup(commands::setup::SetupArgs),

    /// Write the Nightwatch block into the shared .env, then set up the agent
    Enroll(commands::enroll::EnrollArgs),

    /// Find the first free agent port on each host
    FindPort,

    /// Check the supervisor prerequisites on each host
    Validate,

    /// Show the supervisor state of the agent unit
    Status,

    /// Write the default .nightwatch template into the working directory
    Init(commands::init::InitArgs),

    /// List the hosts selected from the inventory
    Hosts,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            config,
            hosts,
            yes,
            json,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes, config, hosts },
        })?;

        match command {
            Command::Setup(args) => commands::setup::run(&app, &args).await,
            Command::Enroll(args) => commands::enroll::run(&app, &args).await,
            Command::FindPort => commands::find_port::run(&app).await,
            Command::Validate => commands::validate::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Init(args) => commands::init::run(&app, &args),
            Command::Hosts => commands::hosts::run(&app),
        }
    }
}
