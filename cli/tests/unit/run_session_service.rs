//! Tests for the interactive session: attach URL checks, terminal restore on
//! every exit path, and byte fidelity in both directions.
//!
//! Raw mode is process-wide, so every test that may acquire it is `#[serial]`.

use deck_cli::application::services::relay::LocalDirection;
use deck_cli::application::services::run_session::{run_attached, start_interactive_process};
use deck_cli::application::services::terminal::RawModeGuard;
use deck_cli::domain::{ApiError, SessionError};
use serial_test::serial;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::helpers::{
    BrokenRemote, ClosedOutput, CountingTerminal, FixedRunsApi, RecordingConnector, credential,
};

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| (*p).to_string()).collect()
}

fn session_error(err: &anyhow::Error) -> Option<&SessionError> {
    err.chain().find_map(|e| e.downcast_ref::<SessionError>())
}

// ── start_interactive_process ─────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_attach_url_is_protocol_violation_and_never_connects() {
    let api = FixedRunsApi::answering(None);
    let (stream, _server) = tokio::io::duplex(64);
    let connector = RecordingConnector::new(stream);

    let err = start_interactive_process(&api, &connector, &credential(), "demo", &argv(&["bash"]))
        .await
        .expect_err("no attach URL");

    assert!(matches!(
        session_error(&err),
        Some(SessionError::ProtocolViolation(_))
    ));
    assert_eq!(connector.calls(), 0);
}

#[tokio::test]
async fn test_blank_attach_url_is_protocol_violation() {
    let api = FixedRunsApi::answering(Some("  "));
    let (stream, _server) = tokio::io::duplex(64);
    let connector = RecordingConnector::new(stream);

    let err = start_interactive_process(&api, &connector, &credential(), "demo", &argv(&["bash"]))
        .await
        .expect_err("blank attach URL");

    assert!(matches!(
        session_error(&err),
        Some(SessionError::ProtocolViolation(_))
    ));
    assert_eq!(connector.calls(), 0);
}

#[tokio::test]
async fn test_malformed_attach_url_never_connects() {
    let api = FixedRunsApi::answering(Some("ftp://run.example.test/x"));
    let (stream, _server) = tokio::io::duplex(64);
    let connector = RecordingConnector::new(stream);

    let err = start_interactive_process(&api, &connector, &credential(), "demo", &argv(&["bash"]))
        .await
        .expect_err("bad scheme");

    assert!(matches!(
        session_error(&err),
        Some(SessionError::ProtocolViolation(_))
    ));
    assert_eq!(connector.calls(), 0);
}

#[tokio::test]
async fn test_attach_url_is_handed_to_the_connector_once() {
    let api = FixedRunsApi::answering(Some("https://run.example.test:4443/attach/7?token=s3cr3t"));
    let (stream, _server) = tokio::io::duplex(64);
    let connector = RecordingConnector::new(stream);

    start_interactive_process(
        &api,
        &connector,
        &credential(),
        "demo",
        &argv(&["rails", "console", "-e", "production"]),
    )
    .await
    .expect("attached");

    assert_eq!(api.commands(), [argv(&["rails", "console", "-e", "production"])]);
    assert_eq!(connector.targets(), ["https://run.example.test:4443/attach/7"]);
}

#[tokio::test]
async fn test_empty_command_is_rejected_before_any_request() {
    let api = FixedRunsApi::answering(Some("http://run.example.test/attach/1"));
    let (stream, _server) = tokio::io::duplex(64);
    let connector = RecordingConnector::new(stream);

    assert!(
        start_interactive_process(&api, &connector, &credential(), "demo", &[])
            .await
            .is_err()
    );
    assert!(api.commands().is_empty());
}

// ── run_attached ──────────────────────────────────────────────────────────────

#[tokio::test]
#[serial]
async fn test_bytes_flow_both_ways_and_terminal_restored_once() {
    let terminal = CountingTerminal::default();
    let (remote, mut server) = tokio::io::duplex(1024);
    let (local_in, mut keyboard) = tokio::io::duplex(1024);
    let mut screen: Vec<u8> = Vec::new();

    let server_task = tokio::spawn(async move {
        let mut typed = [0u8; 3];
        server.read_exact(&mut typed).await.expect("typed");
        server.write_all(b"file1\r\nfile2\r\n").await.expect("output");
        typed
    });

    keyboard.write_all(b"ls\n").await.expect("keyboard");
    let summary = run_attached(&terminal, true, local_in, &mut screen, remote)
        .await
        .expect("session");

    assert_eq!(&server_task.await.expect("server"), b"ls\n");
    assert_eq!(screen, b"file1\r\nfile2\r\n");
    assert_eq!(summary.received, 14);
    assert_eq!(terminal.enters(), 1);
    assert_eq!(terminal.restores(), 1);
    drop(keyboard);
}

#[tokio::test]
#[serial]
async fn test_remote_close_with_pending_local_input_abandons_it() {
    let terminal = CountingTerminal::default();
    let (remote, server) = tokio::io::duplex(64);
    let (local_in, _keyboard) = tokio::io::duplex(64);
    drop(server);

    let summary = run_attached(&terminal, true, local_in, tokio::io::sink(), remote)
        .await
        .expect("clean close");

    assert!(matches!(summary.local_input, LocalDirection::Abandoned));
    assert_eq!(terminal.restores(), 1);
}

#[tokio::test]
#[serial]
async fn test_remote_read_error_is_transport_and_terminal_restored() {
    let terminal = CountingTerminal::default();
    let (local_in, _keyboard) = tokio::io::duplex(64);

    let err = run_attached(&terminal, true, local_in, tokio::io::sink(), BrokenRemote)
        .await
        .expect_err("remote failure");

    assert!(
        err.chain()
            .any(|e| matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Transport { .. })))
    );
    assert_eq!(terminal.restores(), 1);
}

#[tokio::test]
#[serial]
async fn test_local_write_error_ends_session_and_terminal_restored() {
    let terminal = CountingTerminal::default();
    let (remote, mut server) = tokio::io::duplex(64);
    let (local_in, _keyboard) = tokio::io::duplex(64);
    server.write_all(b"hello").await.expect("server");

    let result = run_attached(&terminal, true, local_in, ClosedOutput, remote).await;

    assert!(result.is_err());
    assert_eq!(terminal.enters(), 1);
    assert_eq!(terminal.restores(), 1);
}

#[tokio::test]
#[serial]
async fn test_raw_mode_failure_relays_nothing() {
    let terminal = CountingTerminal::failing();
    let (remote, mut server) = tokio::io::duplex(64);
    let (local_in, mut keyboard) = tokio::io::duplex(64);
    keyboard.write_all(b"rm -rf /\n").await.expect("keyboard");

    let err = run_attached(&terminal, true, local_in, tokio::io::sink(), remote)
        .await
        .expect_err("raw mode fails");
    assert!(err.to_string().contains("not a tty"));
    assert_eq!(terminal.restores(), 0);

    // The remote end saw nothing and is now closed.
    let mut seen = Vec::new();
    server.read_to_end(&mut seen).await.expect("eof");
    assert!(seen.is_empty());

    // The raw-mode flag was released.
    let ok = CountingTerminal::default();
    drop(RawModeGuard::acquire(&ok).expect("flag free again"));
}

#[tokio::test]
#[serial]
async fn test_piped_input_skips_raw_mode() {
    let terminal = CountingTerminal::default();
    let (remote, server) = tokio::io::duplex(64);
    drop(server);

    run_attached(&terminal, false, tokio::io::empty(), tokio::io::sink(), remote)
        .await
        .expect("session");

    assert_eq!(terminal.enters(), 0);
    assert_eq!(terminal.restores(), 0);
}

#[tokio::test]
#[serial]
async fn test_nested_raw_mode_is_terminal_busy() {
    let outer = CountingTerminal::default();
    let _guard = RawModeGuard::acquire(&outer).expect("outer");

    let inner = CountingTerminal::default();
    let (remote, _server) = tokio::io::duplex(64);
    let err = run_attached(&inner, true, tokio::io::empty(), tokio::io::sink(), remote)
        .await
        .expect_err("busy");

    assert!(matches!(session_error(&err), Some(SessionError::TerminalBusy)));
    assert_eq!(inner.enters(), 0);
    assert_eq!(inner.restores(), 0);
}
