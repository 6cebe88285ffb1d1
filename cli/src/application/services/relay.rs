//! Stream relay between the local terminal and a hijacked remote stream.
//!
//! The remote direction defines the session lifetime: the relay returns as
//! soon as the remote side stops sending, whatever the local input is doing.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const CHUNK: usize = 8192;

/// How the local-input direction ended.
#[derive(Debug)]
pub enum LocalDirection {
    /// Local input reached EOF or failed before the remote side closed.
    Finished(io::Result<u64>),
    /// Still running when the remote side closed; it was cancelled.
    Abandoned,
    /// The copy task panicked.
    Panicked,
}

/// Outcome of both relay directions.
#[derive(Debug)]
pub struct RelayReport {
    /// Bytes copied from the remote stream to local output.
    pub remote_to_local: io::Result<u64>,
    pub local_to_remote: LocalDirection,
}

/// Copies bytes from `reader` to `writer` until EOF, flushing after every
/// chunk so interactive output is not held back.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub async fn bridge_io<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = [0u8; CHUNK];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        writer.flush().await?;
        total += n as u64;
    }
    Ok(total)
}

/// Pump bytes both ways until the remote side closes.
///
/// Local input is copied on a spawned task; remote output is copied on the
/// calling task. When the remote direction ends the remote stream is shut
/// down and released even if local input is still pending.
pub async fn relay<I, O, S>(mut local_in: I, mut local_out: O, remote: S) -> RelayReport
where
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin,
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (mut remote_read, mut remote_write) = tokio::io::split(remote);

    // Local EOF does not close the remote stream: the write half is handed
    // back so the coordinator decides when to shut it down.
    let input = tokio::spawn(async move {
        let copied = bridge_io(&mut local_in, &mut remote_write).await;
        (copied, remote_write)
    });

    let remote_to_local = bridge_io(&mut remote_read, &mut local_out).await;

    if !input.is_finished() {
        input.abort();
    }
    let local_to_remote = match input.await {
        Ok((copied, mut write_half)) => {
            if let Err(e) = write_half.shutdown().await {
                tracing::debug!(error = %e, "remote stream shutdown failed");
            }
            LocalDirection::Finished(copied)
        }
        Err(e) if e.is_panic() => LocalDirection::Panicked,
        Err(_) => LocalDirection::Abandoned,
    };
    drop(remote_read);

    RelayReport {
        remote_to_local,
        local_to_remote,
    }
}
