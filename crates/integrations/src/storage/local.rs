//! Local filesystem storage rooted at an output directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use campaign_core::services::AssetStorage;
use campaign_core::{CampaignError, CampaignResult};
use tracing::debug;

/// Writes each object to `{root}/{path}`, creating parent directories.
pub struct LocalFsStorage {
    root: PathBuf,
}

impl LocalFsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path under the root, rejecting `..` and absolute paths.
    /// Locations returned by `save` already carry the root and are accepted as-is.
    fn resolve(&self, path: &str) -> CampaignResult<PathBuf> {
        let relative = Path::new(path)
            .strip_prefix(&self.root)
            .unwrap_or_else(|_| Path::new(path));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(CampaignError::Storage(format!(
                "path escapes storage root: {path}"
            )));
        }
        Ok(self.root.join(relative))
    }

    fn relative_key(&self, full: &Path) -> Option<String> {
        full.strip_prefix(&self.root).ok().map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
    }
}

#[async_trait]
impl AssetStorage for LocalFsStorage {
    async fn save(&self, path: &str, content: &[u8]) -> CampaignResult<String> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;
        debug!(path = %full.display(), bytes = content.len(), "wrote asset to disk");
        Ok(full.to_string_lossy().into_owned())
    }

    async fn load(&self, path: &str) -> CampaignResult<Vec<u8>> {
        let full = self.resolve(path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CampaignError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> CampaignResult<bool> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }

    async fn list(&self, prefix: &str) -> CampaignResult<Vec<String>> {
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Some(key) = self.relative_key(&path) {
                    if key.starts_with(prefix) {
                        found.push(key);
                    }
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn name(&self) -> &str {
        "local"
    }
}
