//! Shared hand-written mocks for the application service tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use anyhow::Result;
use deck_cli::application::ports::{
    AttachConnector, AuthApi, ContainersApi, CredentialStore, ProgressReporter, Prompter, RunsApi,
    TerminalControl,
};
use deck_cli::domain::{ApiError, AttachTarget, Credential};
use deck_common::{Container, ContainerState, RunResponse, User};
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn user() -> User {
    User {
        id: "u-1".to_string(),
        username: "ada".to_string(),
        email: "ada@example.test".to_string(),
    }
}

pub fn credential() -> Credential {
    Credential::issue(&user(), "tok-1".to_string())
}

pub fn container(id: &str, label: &str) -> Container {
    Container {
        id: id.to_string(),
        label: label.to_string(),
        state: ContainerState::Running,
        created_at: None,
    }
}

pub fn unauthorized() -> anyhow::Error {
    ApiError::Unauthorized {
        message: "Invalid login or password.".to_string(),
    }
    .into()
}

// ── Reporters ─────────────────────────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

#[derive(Default)]
pub struct RecordingReporter {
    successes: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().expect("lock").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().expect("lock").clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn success(&self, message: &str) {
        self.successes.lock().expect("lock").push(message.to_string());
    }
    fn warn(&self, message: &str) {
        self.warnings.lock().expect("lock").push(message.to_string());
    }
}

// ── Prompter ──────────────────────────────────────────────────────────────────

/// Replays scripted login lines; every password prompt answers `"pw"`.
pub struct ScriptedPrompter {
    logins: Mutex<VecDeque<io::Result<String>>>,
    login_prompts: Mutex<u32>,
}

impl ScriptedPrompter {
    pub fn new(logins: Vec<io::Result<String>>) -> Self {
        Self {
            logins: Mutex::new(logins.into()),
            login_prompts: Mutex::new(0),
        }
    }

    pub fn with_logins(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| Ok((*l).to_string())).collect())
    }

    pub fn login_prompts(&self) -> u32 {
        *self.login_prompts.lock().expect("lock")
    }
}

impl Prompter for ScriptedPrompter {
    fn read_login(&self, _: &str) -> io::Result<String> {
        *self.login_prompts.lock().expect("lock") += 1;
        self.logins
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more input")))
    }

    fn read_password(&self, _: &str) -> io::Result<String> {
        Ok("pw".to_string())
    }
}

// ── Auth API ──────────────────────────────────────────────────────────────────

/// Answers each login with the next scripted outcome.
pub struct ScriptedAuthApi {
    outcomes: Mutex<VecDeque<Result<String>>>,
    logins: Mutex<Vec<String>>,
}

impl ScriptedAuthApi {
    pub fn new(outcomes: Vec<Result<String>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            logins: Mutex::new(Vec::new()),
        }
    }

    pub fn login_calls(&self) -> usize {
        self.logins.lock().expect("lock").len()
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().expect("lock").clone()
    }
}

impl AuthApi for ScriptedAuthApi {
    async fn login(&self, login: &str, _: &str) -> Result<String> {
        self.logins.lock().expect("lock").push(login.to_string());
        self.outcomes
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| anyhow::bail!("login not expected in this test"))
    }

    async fn get_self(&self, _: &str) -> Result<User> {
        Ok(user())
    }
}

// ── Credential store ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<Credential>>,
    saves: Mutex<u32>,
}

impl MemoryCredentialStore {
    pub fn with(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
            saves: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("lock")
    }

    pub fn stored(&self) -> Option<Credential> {
        self.credential.lock().expect("lock").clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self.stored())
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        *self.saves.lock().expect("lock") += 1;
        *self.credential.lock().expect("lock") = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<bool> {
        Ok(self.credential.lock().expect("lock").take().is_some())
    }
}

// ── Runs API + connector ──────────────────────────────────────────────────────

pub struct FixedRunsApi {
    attach: Option<String>,
    commands: Mutex<Vec<Vec<String>>>,
}

impl FixedRunsApi {
    pub fn answering(attach: Option<&str>) -> Self {
        Self {
            attach: attach.map(str::to_string),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().expect("lock").clone()
    }
}

impl RunsApi for FixedRunsApi {
    async fn start_run(&self, _: &str, argv: &[String]) -> Result<RunResponse> {
        self.commands.lock().expect("lock").push(argv.to_vec());
        Ok(RunResponse {
            attach: self.attach.clone(),
        })
    }
}

/// Hands out one pre-built duplex stream and records the target it was given.
pub struct RecordingConnector {
    stream: Mutex<Option<DuplexStream>>,
    targets: Mutex<Vec<String>>,
}

impl RecordingConnector {
    pub fn new(stream: DuplexStream) -> Self {
        Self {
            stream: Mutex::new(Some(stream)),
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.targets.lock().expect("lock").len()
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().expect("lock").clone()
    }
}

impl AttachConnector for RecordingConnector {
    type Stream = DuplexStream;

    async fn attach(&self, target: AttachTarget, _: &Credential) -> Result<DuplexStream> {
        self.targets.lock().expect("lock").push(target.to_string());
        self.stream
            .lock()
            .expect("lock")
            .take()
            .ok_or_else(|| anyhow::anyhow!("attach URL already used"))
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingTerminal {
    pub fail_enter: bool,
    enters: Mutex<u32>,
    restores: Mutex<u32>,
}

impl CountingTerminal {
    pub fn failing() -> Self {
        Self {
            fail_enter: true,
            ..Self::default()
        }
    }

    pub fn enters(&self) -> u32 {
        *self.enters.lock().expect("lock")
    }

    pub fn restores(&self) -> u32 {
        *self.restores.lock().expect("lock")
    }
}

impl TerminalControl for CountingTerminal {
    fn enter_raw(&self) -> Result<()> {
        *self.enters.lock().expect("lock") += 1;
        if self.fail_enter {
            anyhow::bail!("stty: not a tty");
        }
        Ok(())
    }

    fn restore(&self) -> Result<()> {
        *self.restores.lock().expect("lock") += 1;
        Ok(())
    }
}

// ── Faulty streams ────────────────────────────────────────────────────────────

/// Remote stream whose reads fail; writes are swallowed.
pub struct BrokenRemote;

impl AsyncRead for BrokenRemote {
    fn poll_read(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
        _: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )))
    }
}

impl AsyncWrite for BrokenRemote {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Local output that rejects every write.
pub struct ClosedOutput;

impl AsyncWrite for ClosedOutput {
    fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed")))
    }

    fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

// ── Containers API ────────────────────────────────────────────────────────────

/// Serves a fixed listing and fails deliveries to `failing` IDs.
pub struct FakeContainersApi {
    containers: Vec<Container>,
    failing: HashSet<String>,
    listing_fails: bool,
    deliveries: Mutex<Vec<(String, String)>>,
}

impl FakeContainersApi {
    pub fn new(containers: Vec<Container>) -> Self {
        Self {
            containers,
            failing: HashSet::new(),
            listing_fails: false,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn unreachable() -> Self {
        Self {
            listing_fails: true,
            ..Self::new(Vec::new())
        }
    }

    /// `(container_id, signal)` pairs, sorted.
    pub fn deliveries(&self) -> Vec<(String, String)> {
        let mut d = self.deliveries.lock().expect("lock").clone();
        d.sort();
        d
    }
}

impl ContainersApi for FakeContainersApi {
    async fn list_containers(&self, _: &str) -> Result<Vec<Container>> {
        if self.listing_fails {
            return Err(ApiError::transport(
                "GET /apps/demo/containers",
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )
            .into());
        }
        Ok(self.containers.clone())
    }

    async fn send_container_signal(&self, _: &str, signal: &str, container_id: &str) -> Result<()> {
        self.deliveries
            .lock()
            .expect("lock")
            .push((container_id.to_string(), signal.to_string()));
        if self.failing.contains(container_id) {
            return Err(ApiError::transport(
                format!("POST /apps/demo/containers/{container_id}/kill"),
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            )
            .into());
        }
        Ok(())
    }
}
