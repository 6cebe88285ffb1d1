//! Credential issued by an interactive login.

use anyhow::Result;
use chrono::{DateTime, Utc};
use deck_common::User;
use serde::{Deserialize, Serialize};

/// Maximum number of interactive login attempts before giving up.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Bearer token plus the identity it was issued for.
///
/// Immutable once issued. The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub email: String,
    pub token: String,
    pub issued_at: DateTime<Utc>,
}

impl Credential {
    /// Bind `token` to the canonical profile returned by the API.
    #[must_use]
    pub fn issue(user: &User, token: String) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            token,
            issued_at: Utc::now(),
        }
    }

    /// Rejects credentials that could never authenticate a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the token or username is blank.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.token.trim().is_empty(), "stored credential has an empty token");
        anyhow::ensure!(
            !self.username.trim().is_empty(),
            "stored credential has an empty username"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}
