//! Application service: container listing use-case.

use anyhow::{Context, Result};
use deck_common::Container;

use crate::application::ports::ContainersApi;

/// Live containers of `app`, sorted by label then ID.
///
/// # Errors
///
/// Returns an error if the listing request fails.
pub async fn list_containers(api: &impl ContainersApi, app: &str) -> Result<Vec<Container>> {
    let mut containers = api
        .list_containers(app)
        .await
        .with_context(|| format!("fail to list the containers of '{app}'"))?;
    containers.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
    Ok(containers)
}
