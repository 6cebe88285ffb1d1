//! TCP/TLS implementation of the `AttachConnector` port.

use std::io::BufReader;
use std::sync::Arc;

use anyhow::{Context, Result};
use deck_common::AttachCredentials;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::application::ports::{AttachConnector, Duplex};
use crate::domain::{ApiError, AttachTarget, Credential, DeckConfig};
use crate::infra::hijack::hijack;

/// Connects to attach endpoints over plain TCP or rustls.
pub struct TlsAttachConnector {
    tls: TlsConnector,
}

impl TlsAttachConnector {
    /// Build a connector trusting the Mozilla roots plus `tls.ca_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA bundle cannot be read or holds an invalid
    /// certificate.
    pub fn new(config: &DeckConfig) -> Result<Self> {
        let mut roots: rustls::RootCertStore =
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

        if let Some(path) = &config.tls.ca_file {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open CA bundle: {}", path.display()))?;
            let certs = rustls_pemfile::certs(&mut BufReader::new(file))
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("failed to parse CA bundle: {}", path.display()))?;
            for cert in certs {
                roots
                    .add(cert)
                    .context("failed to add CA cert to root store")?;
            }
        }

        let tls_config = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .context("failed to select TLS protocol versions")?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            tls: TlsConnector::from(Arc::new(tls_config)),
        })
    }
}

impl AttachConnector for TlsAttachConnector {
    type Stream = Box<dyn Duplex>;

    async fn attach(&self, target: AttachTarget, credential: &Credential) -> Result<Self::Stream> {
        let body = serde_json::to_vec(&AttachCredentials {
            user_email: credential.email.clone(),
            user_token: credential.token.clone(),
        })
        .context("serializing attach credentials")?;
        let request = target.upgrade_request(&body);

        let host = target.host().trim_start_matches('[').trim_end_matches(']');
        let addr = (host, target.port());
        let tcp = TcpStream::connect(addr)
            .await
            .map_err(|e| ApiError::transport(format!("connecting to {target}"), e))?;
        if let Err(e) = tcp.set_nodelay(true) {
            tracing::debug!(error = %e, "cannot disable Nagle on attach socket");
        }

        if !target.uses_tls() {
            return Ok(Box::new(hijack(tcp, &request).await?));
        }

        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ApiError::transport(format!("invalid TLS server name '{host}'"), e))?;
        let tls = self
            .tls
            .connect(server_name, tcp)
            .await
            .map_err(|e| ApiError::transport(format!("TLS handshake with {target}"), e))?;
        Ok(Box::new(hijack(tls, &request).await?))
    }
}
