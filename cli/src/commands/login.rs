//! `deck login`: interactive login, replacing any stored credential.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::login::login;
use crate::infra::prompt::TerminalPrompter;

/// Prompt for credentials (up to three attempts) and store the result.
///
/// # Errors
///
/// Returns the last login error after three failures, or an error if the
/// credential cannot be stored.
pub async fn run(app: &AppContext) -> Result<()> {
    let api = app.api()?;
    let credential = login(&TerminalPrompter, &api, &app.credentials, &app.reporter()).await?;
    app.renderer().render_login(&credential)
}
