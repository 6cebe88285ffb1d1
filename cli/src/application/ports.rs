//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;

use anyhow::Result;
use deck_common::{Container, RunResponse, User};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{AttachTarget, Credential, DeckConfig};

// ── API Transport Ports ───────────────────────────────────────────────────────

/// Unauthenticated account endpoints.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Exchange a login identifier and password for a bearer token.
    async fn login(&self, login: &str, password: &str) -> Result<String>;
    /// Fetch the profile `token` was issued for.
    async fn get_self(&self, token: &str) -> Result<User>;
}

/// One-off process endpoints.
#[allow(async_fn_in_trait)]
pub trait RunsApi {
    /// Ask the platform to start `argv` in a one-off container of `app`.
    ///
    /// The answer is returned as decoded; checking it for an attach URL is
    /// the caller's job.
    async fn start_run(&self, app: &str, argv: &[String]) -> Result<RunResponse>;
}

/// Container listing and control endpoints.
#[allow(async_fn_in_trait)]
pub trait ContainersApi {
    /// Snapshot of the application's live containers.
    async fn list_containers(&self, app: &str) -> Result<Vec<Container>>;
    /// Deliver `signal` to one container.
    async fn send_container_signal(&self, app: &str, signal: &str, container_id: &str)
    -> Result<()>;
}

// ── Attach Port ───────────────────────────────────────────────────────────────

/// A bidirectional byte stream that can move between tasks.
pub trait Duplex: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Duplex for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Opens the hijacked connection behind an attach URL.
#[allow(async_fn_in_trait)]
pub trait AttachConnector {
    /// Raw stream handed over after a successful handshake.
    type Stream: Duplex;

    /// Connect to `target`, present `credential` as the upgrade request and
    /// return the raw stream. The target is consumed: attach URLs are
    /// single-use.
    ///
    /// # Errors
    ///
    /// Returns `AttachRejected` on a non-200 handshake (the socket is closed
    /// first), `ProtocolViolation` on an unparseable answer, or a transport
    /// error if the connection cannot be opened.
    async fn attach(&self, target: AttachTarget, credential: &Credential) -> Result<Self::Stream>;
}

// ── Terminal Port ─────────────────────────────────────────────────────────────

/// Mode switches of the controlling terminal. Sync trait, no async needed.
pub trait TerminalControl {
    /// Disable echo and canonical processing.
    fn enter_raw(&self) -> Result<()>;
    /// Re-enable echo and canonical processing.
    fn restore(&self) -> Result<()>;
}

// ── Prompt Port ───────────────────────────────────────────────────────────────

/// Interactive line input.
pub trait Prompter {
    /// Read a visible line. An empty string means the user just hit enter.
    fn read_login(&self, prompt: &str) -> std::io::Result<String>;
    /// Read a line without echoing it.
    fn read_password(&self, prompt: &str) -> std::io::Result<String>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── State and Config Ports ────────────────────────────────────────────────────

/// Persisted credential written after a successful login.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Load the stored credential, returning `None` if nobody is logged in.
    async fn load(&self) -> Result<Option<Credential>>;
    /// Persist `credential`, replacing any previous one.
    async fn save(&self, credential: &Credential) -> Result<()>;
    /// Forget the stored credential. Returns `false` if there was none.
    async fn clear(&self) -> Result<bool>;
}

/// Read-only access to the user configuration file.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    fn load(&self) -> Result<DeckConfig>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
