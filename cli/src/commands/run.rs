//! `deck run`: run a command in a one-off container and attach to it.

use std::io::IsTerminal;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::run_session::{run_attached, start_interactive_process};
use crate::infra::terminal::SttyTerminal;
use crate::output::progress;

/// Arguments for the run command.
#[derive(Args)]
#[command(trailing_var_arg = true)]
pub struct RunArgs {
    /// Application name
    #[arg(short, long)]
    pub app: String,

    /// Command and arguments to run
    #[arg(required = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Start the one-off process and relay the local terminal to it until the
/// remote side closes.
///
/// When stdin is a terminal it is switched to raw mode for the duration of
/// the session; piped input is relayed as-is.
///
/// # Errors
///
/// Returns an error if login, the run request, the attach handshake, or the
/// remote stream fails.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<()> {
    let (credential, api) = app.session().await?;
    let connector = app.connector()?;

    let pb = app
        .output
        .show_progress()
        .then(|| progress::spinner(&format!("Starting '{}'...", args.command.join(" "))));
    let started =
        start_interactive_process(&api, &connector, &credential, &args.app, &args.command).await;
    if let Some(pb) = &pb {
        match &started {
            Ok(_) => progress::finish_ok(pb, &format!("Attached to one-off container of '{}'", args.app)),
            Err(_) => progress::abandon(pb),
        }
    }
    let stream = started?;

    let raw_mode = std::io::stdin().is_terminal();
    let summary = run_attached(
        &SttyTerminal,
        raw_mode,
        tokio::io::stdin(),
        tokio::io::stdout(),
        stream,
    )
    .await?;
    tracing::debug!(received = summary.received, "session ended");
    Ok(())
}
