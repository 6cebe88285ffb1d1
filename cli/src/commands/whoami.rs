//! `deck whoami`: show who the stored credential belongs to.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::CredentialStore as _;

/// Print the identity of the stored credential. No API call is made.
///
/// # Errors
///
/// Returns an error if nobody is logged in or the credential file is
/// unreadable.
pub async fn run(app: &AppContext) -> Result<()> {
    let credential = app
        .credentials
        .load()
        .await?
        .context("not logged in, run `deck login` first")?;
    app.renderer().render_profile(&credential)
}
