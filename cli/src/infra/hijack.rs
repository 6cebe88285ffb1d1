//! HTTP-to-raw-stream handover for the attach endpoint.
//!
//! The attach endpoint answers the upgrade `POST` with a response head and
//! then keeps the socket open, using it as the process's stdio tunnel. The
//! response body is never framed: whatever follows the head belongs to the
//! raw stream, so a missing `Content-Length` or a kept-alive connection is
//! the expected outcome, not an error.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::domain::{ApiError, SessionError};

/// Upper bound on the response head; anything larger is not an attach answer.
const MAX_HEAD_LEN: usize = 16 * 1024;
const MAX_HEADERS: usize = 64;

/// Status line of the handshake response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub status: u16,
    pub reason: String,
}

impl HandshakeResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// `"403 Forbidden"`-style text.
    #[must_use]
    pub fn status_text(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

/// A connection to the attach endpoint, before or after the handshake.
///
/// The raw stream is only reachable from `Established`, and `Established`
/// refuses a second handshake.
pub enum AttachConnection<S> {
    Handshaking(S),
    Established {
        response: HandshakeResponse,
        stream: RawDuplex<S>,
    },
}

impl<S: AsyncRead + AsyncWrite + Unpin> AttachConnection<S> {
    #[must_use]
    pub fn new(stream: S) -> Self {
        Self::Handshaking(stream)
    }

    /// Send the upgrade `request` and read the response head.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolViolation` if the connection is already established,
    /// closes before a complete head, or answers with an unparseable head.
    /// Socket failures are [`ApiError::Transport`]. The stream is dropped on
    /// error.
    pub async fn handshake(self, request: &[u8]) -> Result<Self> {
        let mut stream = match self {
            Self::Handshaking(stream) => stream,
            Self::Established { .. } => {
                return Err(SessionError::ProtocolViolation(
                    "connection already hijacked".to_string(),
                )
                .into());
            }
        };

        stream
            .write_all(request)
            .await
            .map_err(|e| ApiError::transport("sending the attach request", e))?;
        stream
            .flush()
            .await
            .map_err(|e| ApiError::transport("sending the attach request", e))?;

        let (response, leftover) = read_response_head(&mut stream).await?;
        tracing::debug!(status = response.status, "attach handshake answered");

        Ok(Self::Established {
            response,
            stream: RawDuplex::new(leftover, stream),
        })
    }

    #[must_use]
    pub fn response(&self) -> Option<&HandshakeResponse> {
        match self {
            Self::Handshaking(_) => None,
            Self::Established { response, .. } => Some(response),
        }
    }

    /// Take the raw stream out of an established connection.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolViolation` if the handshake has not happened.
    pub fn into_raw(self) -> Result<RawDuplex<S>> {
        match self {
            Self::Handshaking(_) => Err(SessionError::ProtocolViolation(
                "attach handshake not completed".to_string(),
            )
            .into()),
            Self::Established { stream, .. } => Ok(stream),
        }
    }
}

/// Run the handshake on `stream` and hand it over as a raw duplex stream.
///
/// # Errors
///
/// Returns [`SessionError::AttachRejected`] when the answer is not 200; the
/// socket is shut down and dropped before returning.
pub async fn hijack<S>(stream: S, request: &[u8]) -> Result<RawDuplex<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let conn = AttachConnection::new(stream).handshake(request).await?;
    let rejected = conn
        .response()
        .filter(|r| !r.is_ok())
        .map(HandshakeResponse::status_text);

    let mut raw = conn.into_raw()?;
    if let Some(status) = rejected {
        if let Err(e) = raw.shutdown().await {
            tracing::debug!(error = %e, "closing rejected attach connection");
        }
        return Err(SessionError::AttachRejected { status }.into());
    }
    Ok(raw)
}

async fn read_response_head<S>(stream: &mut S) -> Result<(HandshakeResponse, Vec<u8>)>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| ApiError::transport("reading the attach response", e))?;
        if n == 0 {
            return Err(SessionError::ProtocolViolation(
                "connection closed during attach handshake".to_string(),
            )
            .into());
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some((response, head_len)) = parse_head(&buf)? {
            let leftover = buf.split_off(head_len);
            return Ok((response, leftover));
        }
        if buf.len() > MAX_HEAD_LEN {
            return Err(SessionError::ProtocolViolation(
                "attach response head too large".to_string(),
            )
            .into());
        }
    }
}

/// Parse a complete response head, or `None` if more bytes are needed.
fn parse_head(buf: &[u8]) -> Result<Option<(HandshakeResponse, usize)>> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut res = httparse::Response::new(&mut headers);
    match res.parse(buf) {
        Ok(httparse::Status::Complete(len)) => {
            let status = res.code.unwrap_or_default();
            let reason = res.reason.unwrap_or_default().to_string();
            Ok(Some((HandshakeResponse { status, reason }, len)))
        }
        Ok(httparse::Status::Partial) => Ok(None),
        Err(e) => Err(SessionError::ProtocolViolation(format!(
            "invalid attach response: {e}"
        ))
        .into()),
    }
}

// ── Raw stream ────────────────────────────────────────────────────────────────

/// The hijacked connection: bytes read past the response head are replayed
/// before reading from the socket again.
pub struct RawDuplex<S> {
    prefix: Vec<u8>,
    pos: usize,
    inner: S,
}

impl<S> RawDuplex<S> {
    fn new(prefix: Vec<u8>, inner: S) -> Self {
        Self {
            prefix,
            pos: 0,
            inner,
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for RawDuplex<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos < this.prefix.len() {
            let pending = &this.prefix[this.pos..];
            let n = pending.len().min(buf.remaining());
            buf.put_slice(&pending[..n]);
            this.pos += n;
            if this.pos == this.prefix.len() {
                this.prefix = Vec::new();
                this.pos = 0;
            }
            return Poll::Ready(Ok(()));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for RawDuplex<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
