//! Application service: interactive one-off process use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::application::ports::{AttachConnector, RunsApi, TerminalControl};
use crate::application::services::relay::{LocalDirection, relay};
use crate::application::services::terminal::RawModeGuard;
use crate::domain::{ApiError, AttachTarget, Credential, SessionError};

/// Summary of a finished interactive session.
#[derive(Debug)]
pub struct SessionSummary {
    /// Bytes received from the remote process.
    pub received: u64,
    /// How local input ended; informational only.
    pub local_input: LocalDirection,
}

/// Start `argv` as a one-off process of `app` and return the raw stream
/// attached to its stdio.
///
/// No retry happens here: a failed attach consumes the attach URL and the
/// caller must request a new run to try again.
///
/// # Errors
///
/// - `Unauthorized` / transport errors from the run request
/// - `ProtocolViolation` if the answer has no attach URL or it is malformed;
///   no connection is attempted in that case
/// - `AttachRejected` if the hijack handshake does not answer 200
pub async fn start_interactive_process<C: AttachConnector>(
    api: &impl RunsApi,
    connector: &C,
    credential: &Credential,
    app: &str,
    argv: &[String],
) -> Result<C::Stream> {
    anyhow::ensure!(!argv.is_empty(), "a command to run is required");

    let run = api
        .start_run(app, argv)
        .await
        .with_context(|| format!("fail to run one-off container for '{app}'"))?;

    let raw_url = run
        .attach
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| SessionError::ProtocolViolation("missing attach URL".to_string()))?;
    let target = AttachTarget::parse(&raw_url)?;

    tracing::debug!(%target, "attaching to one-off process");
    connector
        .attach(target, credential)
        .await
        .context("fail to attach to the one-off process")
}

/// Relay `remote` to the local terminal until the remote process exits.
///
/// When `raw_mode` is set, the terminal is switched to raw mode before any
/// byte is relayed and restored exactly once afterwards, on every exit path.
///
/// # Errors
///
/// Returns the raw-mode error if the terminal cannot be switched (no bytes
/// are relayed), or a transport error if the remote direction fails.
pub async fn run_attached<T, I, O, S>(
    terminal: &T,
    raw_mode: bool,
    local_in: I,
    local_out: O,
    remote: S,
) -> Result<SessionSummary>
where
    T: TerminalControl + ?Sized,
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let guard = if raw_mode {
        Some(RawModeGuard::acquire(terminal)?)
    } else {
        None
    };

    let report = relay(local_in, local_out, remote).await;
    drop(guard);

    match &report.local_to_remote {
        LocalDirection::Finished(Err(e)) => {
            tracing::debug!(error = %e, "local input relay ended with an error");
        }
        LocalDirection::Panicked => tracing::warn!("local input relay panicked"),
        LocalDirection::Finished(Ok(_)) | LocalDirection::Abandoned => {}
    }

    let received = report
        .remote_to_local
        .map_err(|e| ApiError::transport("relaying the remote process output", e))?;

    Ok(SessionSummary {
        received,
        local_input: report.local_to_remote,
    })
}
