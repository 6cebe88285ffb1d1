//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ── API transport errors ──────────────────────────────────────────────────────

/// Failures surfaced by the control-plane API transport.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the credential; `message` comes from its payload.
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{method} {url} invalid status {status}")]
    UnexpectedStatus {
        method: String,
        url: String,
        status: String,
    },

    /// Network, TLS or decoding failure.
    #[error("{context}")]
    Transport {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl ApiError {
    pub fn transport(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            context: context.into(),
            source: source.into(),
        }
    }
}

// ── Interactive session errors ────────────────────────────────────────────────

/// Errors raised while establishing or running an interactive session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server answered with something this client cannot interpret.
    #[error("Unexpected answer from server: {0}")]
    ProtocolViolation(String),

    #[error("Fail to attach: {status}")]
    AttachRejected { status: String },

    #[error("Terminal is already in raw mode for another session.")]
    TerminalBusy,

    #[error("Fail to set terminal in raw mode")]
    RawMode(#[source] std::io::Error),
}

// ── Signal dispatch errors ────────────────────────────────────────────────────

/// Invalid arguments and aggregate failures of `send-signal`.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("at least one container name should be given")]
    NoContainerNames,

    #[error("signal must not be empty")]
    EmptySignal,

    #[error("no container matched the given names")]
    NothingMatched,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The innermost error of a chain, rendered for humans.
#[must_use]
pub fn root_cause(err: &anyhow::Error) -> String {
    err.root_cause().to_string()
}

/// Returns `true` if any error in the chain is [`ApiError::Unauthorized`].
#[must_use]
pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    err.chain().any(|e| {
        matches!(
            e.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthorized { .. })
        )
    })
}
