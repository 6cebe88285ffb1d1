//! Infrastructure implementation of the `CredentialStore` port.
//!
//! `FileCredentialStore` keeps the login credential as JSON, written with an
//! atomic temp-file + rename so a crash never leaves half a token on disk.

use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::CredentialStore;
use crate::domain::Credential;

/// Credential file manager.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store at `DECK_AUTH_FILE`, or `~/.deck/auth.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        if let Ok(val) = std::env::var("DECK_AUTH_FILE")
            && !val.is_empty()
        {
            return Ok(Self::with_path(PathBuf::from(val)));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(home.join(".deck").join("auth.json")))
    }

    /// Create a store with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

fn load_sync(path: &Path) -> Result<Option<Credential>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading credential file {}", path.display()))?;
    let credential: Credential = serde_json::from_str(&content)
        .with_context(|| format!("parsing credential file {}", path.display()))?;
    Ok(Some(credential))
}

fn save_sync(path: &Path, credential: &Credential) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(credential).context("serializing credential")?;

    let temp_path = path.with_extension("json.tmp");
    // A leftover temp file would keep its old mode.
    match std::fs::remove_file(&temp_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("removing stale temp file {}", temp_path.display()));
        }
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(&temp_path)
        .with_context(|| format!("creating temp file {}", temp_path.display()))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("writing temp file {}", temp_path.display()))?;
    drop(file);

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("finalizing credential file {}", path.display()))?;
    Ok(())
}

fn clear_sync(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("removing credential file {}", path.display()))?;
    Ok(true)
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_sync(&path))
            .await
            .context("credential load task panicked")?
    }

    async fn save(&self, credential: &Credential) -> Result<()> {
        let path = self.path.clone();
        let credential = credential.clone();
        tokio::task::spawn_blocking(move || save_sync(&path, &credential))
            .await
            .context("credential save task panicked")?
    }

    async fn clear(&self) -> Result<bool> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || clear_sync(&path))
            .await
            .context("credential clear task panicked")?
    }
}
