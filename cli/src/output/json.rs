//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the renderer for successful results.

use anyhow::{Context, Result};
use deck_common::Container;
use serde::Serialize;

use crate::application::services::send_signal::SignalReport;
use crate::domain::error::is_unauthorized;
use crate::domain::{ApiError, Credential, SessionError, SignalError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for `err`.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if is_unauthorized(err) {
        return "unauthorized";
    }
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<SessionError>() {
            return match e {
                SessionError::ProtocolViolation(_) => "protocol_violation",
                SessionError::AttachRejected { .. } => "attach_rejected",
                SessionError::TerminalBusy | SessionError::RawMode(_) => "terminal",
            };
        }
        if let Some(e) = cause.downcast_ref::<SignalError>() {
            return match e {
                SignalError::NothingMatched => "nothing_matched",
                SignalError::NoContainerNames | SignalError::EmptySignal => "invalid_argument",
            };
        }
        if let Some(e) = cause.downcast_ref::<ApiError>() {
            return match e {
                ApiError::Unauthorized { .. } => "unauthorized",
                ApiError::UnexpectedStatus { .. } => "unexpected_status",
                ApiError::Transport { .. } => "transport",
            };
        }
    }
    "error"
}

/// Renders results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        Self::print(&serde_json::json!({ "version": version }))
    }

    /// The token is never part of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_profile(&self, credential: &Credential) -> Result<()> {
        Self::print(&serde_json::json!({
            "username": credential.username,
            "email": credential.email,
            "issued_at": credential.issued_at,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_logout(&self, removed: bool) -> Result<()> {
        Self::print(&serde_json::json!({ "logged_out": removed }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_containers(&self, app: &str, containers: &[Container]) -> Result<()> {
        Self::print(&serde_json::json!({ "app": app, "containers": containers }))
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_signal_report(&self, report: &SignalReport) -> Result<()> {
        Self::print(report)
    }
}
