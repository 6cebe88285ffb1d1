use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Authentication ────────────────────────────────────────────────────────────

/// Body of `POST /users/sign_in`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub user: LoginParams,
}

/// Login identifier (username or email) and password.
#[derive(Debug, Clone, Serialize)]
pub struct LoginParams {
    pub login: String,
    pub password: String,
}

/// Successful sign-in answer.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub authentication_token: String,
}

/// Payload sent alongside a `401` from the sign-in endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Account profile as returned by `GET /users/self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfResponse {
    pub user: User,
}

// ── One-off runs ──────────────────────────────────────────────────────────────

/// Body of `POST /apps/{app}/run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    pub command: String,
}

/// Answer to a run request. `attach` is the single-use hijack endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub attach: Option<String>,
}

/// Identity fields posted to the attach endpoint before the connection is
/// handed over as a raw stream.
#[derive(Debug, Clone, Serialize)]
pub struct AttachCredentials {
    pub user_email: String,
    pub user_token: String,
}

// ── Containers ────────────────────────────────────────────────────────────────

/// Liveness of a container at the time it was listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Booting,
    Running,
    Stopping,
    Stopped,
    Crashed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booting => "booting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Crashed => "crashed",
            Self::Unknown => "unknown",
        }
    }
}

/// A running instance of an application process.
///
/// `id` is unique; `label` is the human name (e.g. `web-1`) and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub state: ContainerState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainersResponse {
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// Body of `POST /apps/{app}/containers/{id}/kill`.
#[derive(Debug, Clone, Serialize)]
pub struct SignalRequest {
    pub signal: String,
}
