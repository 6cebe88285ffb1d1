//! Application service: interactive authentication use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::io::ErrorKind;

use anyhow::{Context, Result};

use crate::application::ports::{AuthApi, CredentialStore, ProgressReporter, Prompter};
use crate::domain::{Credential, MAX_LOGIN_ATTEMPTS};

const LOGIN_PROMPT: &str = "Username or email";
const PASSWORD_PROMPT: &str = "Password";

/// Run the interactive login, retrying up to [`MAX_LOGIN_ATTEMPTS`] times.
///
/// Every failed attempt is reported through `reporter` as
/// `Fail to login (n/3): <error>`, and a successful one is greeted. The
/// returned credential is not persisted.
///
/// # Errors
///
/// Returns the error of the last attempt once all attempts have failed.
pub async fn authenticate(
    prompter: &impl Prompter,
    api: &impl AuthApi,
    reporter: &impl ProgressReporter,
) -> Result<Credential> {
    let mut attempt = 1;
    loop {
        match try_authenticate(prompter, api).await {
            Ok(credential) => {
                reporter.success(&format!(
                    "Hello {}, nice to see you !",
                    credential.username
                ));
                return Ok(credential);
            }
            Err(e) => {
                reporter.warn(&format!(
                    "Fail to login ({attempt}/{MAX_LOGIN_ATTEMPTS}): {e:#}"
                ));
                if attempt >= MAX_LOGIN_ATTEMPTS {
                    return Err(e);
                }
                attempt += 1;
            }
        }
    }
}

/// Authenticate interactively and persist the resulting credential.
///
/// # Errors
///
/// Returns an error if authentication fails or the credential cannot be
/// stored.
pub async fn login(
    prompter: &impl Prompter,
    api: &impl AuthApi,
    store: &impl CredentialStore,
    reporter: &impl ProgressReporter,
) -> Result<Credential> {
    let credential = authenticate(prompter, api, reporter).await?;
    store
        .save(&credential)
        .await
        .context("fail to store the credential")?;
    Ok(credential)
}

/// Return the stored credential, logging in interactively when there is none.
///
/// A stored credential is trusted as-is; if the server has revoked it the
/// next API call fails with `Unauthorized`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the login fails.
pub async fn ensure_credential(
    prompter: &impl Prompter,
    api: &impl AuthApi,
    store: &impl CredentialStore,
    reporter: &impl ProgressReporter,
) -> Result<Credential> {
    match store.load().await? {
        Some(credential) if credential.validate().is_ok() => Ok(credential),
        Some(_) => {
            tracing::warn!("stored credential is unusable, logging in again");
            login(prompter, api, store, reporter).await
        }
        None => login(prompter, api, store, reporter).await,
    }
}

async fn try_authenticate(prompter: &impl Prompter, api: &impl AuthApi) -> Result<Credential> {
    let login = read_login(prompter)?;
    let password = prompter
        .read_password(PASSWORD_PROMPT)
        .context("reading password")?;

    let token = api.login(&login, &password).await?;
    let user = api
        .get_self(&token)
        .await
        .context("fetching the authenticated profile")?;

    tracing::debug!(username = %user.username, "authenticated");
    Ok(Credential::issue(&user, token))
}

/// Prompt until a non-blank login is entered.
fn read_login(prompter: &impl Prompter) -> Result<String> {
    loop {
        match prompter.read_login(LOGIN_PROMPT) {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => return Ok(line.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e).context("reading login"),
        }
    }
}
