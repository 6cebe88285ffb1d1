//! `deck ps`: list the live containers of an application.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::containers::list_containers;

/// Arguments for the ps command.
#[derive(Args)]
pub struct PsArgs {
    /// Application name
    #[arg(short, long)]
    pub app: String,
}

/// # Errors
///
/// Returns an error if login or the listing request fails.
pub async fn run(app: &AppContext, args: &PsArgs) -> Result<()> {
    let (_, api) = app.session().await?;
    let containers = list_containers(&api, &args.app).await?;
    app.renderer().render_containers(&args.app, &containers)
}
