//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is built once from the global flags and owns the output
//! context, the effective configuration, and the credential store.

use anyhow::Result;

use crate::application::ports::ConfigStore as _;
use crate::application::services::login::ensure_credential;
use crate::domain::{Credential, DeckConfig};
use crate::infra::api::HttpApiClient;
use crate::infra::attach::TlsAttachConnector;
use crate::infra::config::YamlConfigStore;
use crate::infra::credentials::FileCredentialStore;
use crate::infra::prompt::TerminalPrompter;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// API base URL from `--api-url` or `DECK_API_URL`.
    pub api_url: Option<String>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Effective configuration: file values overridden by flags.
    pub config: DeckConfig,
    /// Where the login credential lives.
    pub credentials: FileCredentialStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid, the API URL
    /// override is not an http(s) URL, or the home directory is unknown.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let config = YamlConfigStore
            .load()?
            .with_api_url(flags.api_url.as_deref());
        config.validate()?;
        tracing::debug!(api = config.api_base(), "configuration loaded");

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config,
            credentials: FileCredentialStore::new()?,
        })
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }

    /// Unauthenticated API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn api(&self) -> Result<HttpApiClient> {
        HttpApiClient::new(&self.config)
    }

    /// Attach connector honouring `tls.ca_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA bundle cannot be loaded.
    pub fn connector(&self) -> Result<TlsAttachConnector> {
        TlsAttachConnector::new(&self.config)
    }

    /// Stored credential plus a client authenticated with it, prompting for
    /// a login first when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the login fails three times or the credential
    /// cannot be stored.
    pub async fn session(&self) -> Result<(Credential, HttpApiClient)> {
        let api = self.api()?;
        let credential =
            ensure_credential(&TerminalPrompter, &api, &self.credentials, &self.reporter())
                .await?;
        let client = api.with_token(credential.token.clone());
        Ok((credential, client))
    }
}
