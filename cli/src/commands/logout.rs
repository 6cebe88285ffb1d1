//! `deck logout`: forget the stored credential.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::ports::CredentialStore as _;

/// # Errors
///
/// Returns an error if the credential file exists but cannot be removed.
pub async fn run(app: &AppContext) -> Result<()> {
    let removed = app.credentials.clear().await?;
    app.renderer().render_logout(removed)
}
