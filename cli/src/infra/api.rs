//! HTTP implementation of the control-plane API ports.

use anyhow::{Context, Result};
use deck_common::{
    Container, ContainersResponse, LoginErrorBody, LoginParams, LoginRequest, RunRequest,
    RunResponse, SelfResponse, SignalRequest, TokenResponse, User,
};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::application::ports::{AuthApi, ContainersApi, RunsApi};
use crate::domain::{ApiError, DeckConfig};

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("deck/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed client for the control-plane API.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

impl HttpApiClient {
    /// Build an unauthenticated client for the API in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is not a valid base URL, or the extra
    /// CA bundle cannot be read or parsed.
    pub fn new(config: &DeckConfig) -> Result<Self> {
        let base = Url::parse(config.api_base())
            .with_context(|| format!("invalid API URL {}", config.api_base()))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("invalid API URL {}", config.api_base());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(path) = &config.tls.ca_file {
            let pem = std::fs::read(path)
                .with_context(|| format!("cannot read CA bundle {}", path.display()))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .with_context(|| format!("cannot parse CA bundle {}", path.display()))?;
            builder = builder.add_root_certificate(cert);
        }
        let http = builder.build().context("cannot build HTTP client")?;

        Ok(Self {
            http,
            base,
            token: None,
        })
    }

    /// Same client, authenticating every request with `token`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL with `segments` appended, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send `req` and fail unless the answer status is in `expected`.
    async fn send(
        &self,
        method: Method,
        url: &str,
        req: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Response> {
        tracing::debug!(%method, url, "api request");
        let res = req
            .send()
            .await
            .map_err(|e| ApiError::transport(format!("{method} {url}"), e))?;

        let status = res.status();
        if expected.contains(&status) {
            return Ok(res);
        }
        // The body only matters for the error message.
        let body = res.bytes().await.unwrap_or_default();
        Err(check_status(method.as_str(), url, status, &body, expected)
            .err()
            .unwrap_or_else(|| unexpected(method.as_str(), url, status))
            .into())
    }
}

async fn decode<T: DeserializeOwned>(res: Response, url: &str) -> Result<T> {
    res.json::<T>()
        .await
        .map_err(|e| ApiError::transport(format!("decoding the answer of {url}"), e).into())
}

fn unexpected(method: &str, url: &str, status: StatusCode) -> ApiError {
    ApiError::UnexpectedStatus {
        method: method.to_string(),
        url: url.to_string(),
        status: status.to_string(),
    }
}

/// Map an answer status to the API error it stands for.
///
/// `401` becomes [`ApiError::Unauthorized`] with the server's message when
/// the body carries one; any other status outside `expected` becomes
/// [`ApiError::UnexpectedStatus`].
///
/// # Errors
///
/// Returns the mapped error when `status` is not expected.
pub fn check_status(
    method: &str,
    url: &str,
    status: StatusCode,
    body: &[u8],
    expected: &[StatusCode],
) -> std::result::Result<(), ApiError> {
    if expected.contains(&status) {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED {
        let message = serde_json::from_slice::<LoginErrorBody>(body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "not authorized".to_string());
        return Err(ApiError::Unauthorized { message });
    }
    Err(unexpected(method, url, status))
}

impl AuthApi for HttpApiClient {
    async fn login(&self, login: &str, password: &str) -> Result<String> {
        let url = self.endpoint(&["users", "sign_in"]);
        let body = LoginRequest {
            user: LoginParams {
                login: login.to_string(),
                password: password.to_string(),
            },
        };
        let req = self.http.post(&url).json(&body);
        let res = self
            .send(Method::POST, &url, req, &[StatusCode::CREATED])
            .await?;
        let token: TokenResponse = decode(res, &url).await?;
        Ok(token.authentication_token)
    }

    async fn get_self(&self, token: &str) -> Result<User> {
        let url = self.endpoint(&["users", "self"]);
        let req = self.http.get(&url).bearer_auth(token);
        let res = self.send(Method::GET, &url, req, &[StatusCode::OK]).await?;
        let me: SelfResponse = decode(res, &url).await?;
        Ok(me.user)
    }
}

impl RunsApi for HttpApiClient {
    async fn start_run(&self, app: &str, argv: &[String]) -> Result<RunResponse> {
        let url = self.endpoint(&["apps", app, "run"]);
        let body = RunRequest {
            command: argv.join(" "),
        };
        let req = self.request(Method::POST, &url).json(&body);
        let res = self
            .send(
                Method::POST,
                &url,
                req,
                &[StatusCode::OK, StatusCode::CREATED],
            )
            .await?;
        decode(res, &url).await
    }
}

impl ContainersApi for HttpApiClient {
    async fn list_containers(&self, app: &str) -> Result<Vec<Container>> {
        let url = self.endpoint(&["apps", app, "containers"]);
        let req = self.request(Method::GET, &url);
        let res = self.send(Method::GET, &url, req, &[StatusCode::OK]).await?;
        let listing: ContainersResponse = decode(res, &url).await?;
        Ok(listing.containers)
    }

    async fn send_container_signal(
        &self,
        app: &str,
        signal: &str,
        container_id: &str,
    ) -> Result<()> {
        let url = self.endpoint(&["apps", app, "containers", container_id, "kill"]);
        let body = SignalRequest {
            signal: signal.to_string(),
        };
        let req = self.request(Method::POST, &url).json(&body);
        self.send(
            Method::POST,
            &url,
            req,
            &[
                StatusCode::OK,
                StatusCode::CREATED,
                StatusCode::ACCEPTED,
                StatusCode::NO_CONTENT,
            ],
        )
        .await?;
        Ok(())
    }
}
