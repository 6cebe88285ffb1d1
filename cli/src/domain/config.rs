//! Domain types and validators for deck configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Control-plane API used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://api.appsdeck.eu";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.deck/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeckConfig {
    /// Control-plane API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Extra trust material for the attach connection.
    #[serde(default)]
    pub tls: TlsConfig,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
        }
    }
}

/// TLS configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TlsConfig {
    /// PEM bundle trusted in addition to the bundled Mozilla roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl DeckConfig {
    /// Apply a higher-precedence API URL (flag or environment).
    #[must_use]
    pub fn with_api_url(mut self, url: Option<&str>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.url = url.trim().to_string();
        }
        self
    }

    /// Validate every setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        validate_api_url(&self.api.url)?;
        if let Some(path) = &self.tls.ca_file
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                key: "tls.ca_file".to_string(),
                value: String::new(),
                reason: "Expected a path to a PEM file.".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// API base URL without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api.url.trim_end_matches('/')
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates the API base URL.
///
/// # Errors
///
/// Returns an error unless `value` is an absolute `http` or `https` URL.
pub fn validate_api_url(value: &str) -> Result<()> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: "api.url".to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(value).map_err(|_| invalid("Expected an absolute URL."))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("Valid schemes: http, https").into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
