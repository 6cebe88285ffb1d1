//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Run one-off processes and control containers on deck
#[derive(Parser)]
#[command(
    name = "deck",
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
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control-plane API base URL
    #[arg(long, global = true, env = "DECK_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the credential
    Login,

    /// Forget the stored credential
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Run a command in a one-off container and attach to it
    Run(commands::run::RunArgs),

    /// List the containers of an application
    Ps(commands::ps::PsArgs),

    /// Send a signal to containers by label
    #[command(name = "send-signal", visible_alias = "kill")]
    SendSignal(commands::send_signal::SendSignalArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            verbose: _,
            api_url,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            api_url,
        })?;

        match command {
            Command::Login => commands::login::run(&app).await,
            Command::Logout => commands::logout::run(&app).await,
            Command::Whoami => commands::whoami::run(&app).await,
            Command::Run(args) => commands::run::run(&app, &args).await,
            Command::Ps(args) => commands::ps::run(&app, &args).await,
            Command::SendSignal(args) => commands::send_signal::run(&app, &args).await,
            Command::Version => commands::version::run(&app),
        }
    }
}
