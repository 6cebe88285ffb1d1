//! Attach endpoint returned by the platform for one remote process.

use anyhow::Result;
use url::Url;

use crate::domain::error::SessionError;

/// Single-use hijack endpoint for one running process.
///
/// Deliberately not `Clone`: connecting consumes the target, so a second
/// handshake against the same endpoint cannot be expressed.
#[derive(Debug)]
pub struct AttachTarget {
    url: Url,
}

impl AttachTarget {
    /// Parse the attach URL from a run answer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ProtocolViolation`] if the URL is malformed,
    /// has no host, or uses a scheme other than `http`/`https`.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim()).map_err(|e| {
            SessionError::ProtocolViolation(format!("invalid attach URL '{raw}': {e}"))
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(SessionError::ProtocolViolation(format!(
                    "unsupported attach URL scheme '{other}'"
                ))
                .into());
            }
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(
                SessionError::ProtocolViolation(format!("attach URL '{raw}' has no host")).into(),
            );
        }
        Ok(Self { url })
    }

    #[must_use]
    pub fn uses_tls(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Host name as used for DNS and TLS server name.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.url
            .port_or_known_default()
            .unwrap_or(if self.uses_tls() { 443 } else { 80 })
    }

    /// `Host` header value: the port is only included when non-default.
    #[must_use]
    pub fn host_header(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}:{port}", self.host()),
            None => self.host().to_string(),
        }
    }

    /// Origin-form request target (`/path?query`).
    #[must_use]
    pub fn request_target(&self) -> String {
        match self.url.query() {
            Some(q) => format!("{}?{q}", self.url.path()),
            None => self.url.path().to_string(),
        }
    }

    /// Serialized `POST` carrying `body` as the upgrade request.
    #[must_use]
    pub fn upgrade_request(&self, body: &[u8]) -> Vec<u8> {
        let head = format!(
            "POST {target} HTTP/1.1\r\n\
             Host: {host}\r\n\
             User-Agent: deck/{version}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {len}\r\n\
             Connection: keep-alive\r\n\
             \r\n",
            target = self.request_target(),
            host = self.host_header(),
            version = env!("CARGO_PKG_VERSION"),
            len = body.len(),
        );
        let mut out = head.into_bytes();
        out.extend_from_slice(body);
        out
    }
}

impl std::fmt::Display for AttachTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Attach URLs may embed a session secret in the query string.
        write!(f, "{}://{}{}", self.url.scheme(), self.host_header(), self.url.path())
    }
}
