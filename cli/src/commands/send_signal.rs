//! `deck send-signal`: deliver a signal to containers by label.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::send_signal::send_signal;
use crate::domain::{SignalError, validate_signal_request};

/// Arguments for the send-signal command.
#[derive(Args)]
pub struct SendSignalArgs {
    /// Application name
    #[arg(short, long)]
    pub app: String,

    /// Signal to send, e.g. SIGUSR1
    #[arg(short, long)]
    pub signal: String,

    /// Labels of the containers to signal (e.g. web-1)
    pub names: Vec<String>,
}

/// # Errors
///
/// Returns an error on invalid arguments, if the containers cannot be
/// listed, if the user interrupts, or if no name matched any container.
/// Individual delivery failures are reported but do not fail the command.
pub async fn run(app: &AppContext, args: &SendSignalArgs) -> Result<()> {
    // Reject bad arguments before prompting for a login.
    validate_signal_request(&args.signal, &args.names)?;

    let (_, api) = app.session().await?;
    let report = tokio::select! {
        report = send_signal(&api, &args.app, &args.signal, &args.names) => report?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted"),
    };

    app.renderer().render_signal_report(&report)?;
    if report.nothing_matched() {
        return Err(SignalError::NothingMatched.into());
    }
    if report.failed_count() > 0 {
        tracing::debug!(failed = report.failed_count(), "some deliveries failed");
    }
    Ok(())
}
