use crate::backend::Storage;
use crate::{Result, StorageError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Local filesystem storage backend
pub struct FileSystemStorage {
    base_url: String,
    root: PathBuf,
}

impl FileSystemStorage {
    pub fn new(base_url: String, root: PathBuf) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            root,
        }
    }

    /// Maps a storage name onto a path under the root, refusing anything that could escape it
    fn path(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let valid = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn metadata(&self, name: &str) -> Result<Option<std::fs::Metadata>> {
        match tokio::fs::metadata(self.path(name)?).await {
            Ok(metadata) if metadata.is_file() => Ok(Some(metadata)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn list_files(root: &Path) -> std::io::Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        names.push(name);
    }

    names.sort();
    Ok(names)
}

#[async_trait::async_trait]
impl Storage for FileSystemStorage {
    async fn open(&self, name: &str) -> Result<Bytes> {
        match tokio::fs::read(self.path(name)?).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::FileNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, name: &str, content: Bytes) -> Result<String> {
        let path = self.path(name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, &content).await?;

        tracing::info!("Saved {} ({} bytes) to {}", name, content.len(), path.display());
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(name)?).await {
            Ok(()) => {
                tracing::info!("Deleted {}", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.metadata(name).await?.is_some())
    }

    async fn listdir(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        let names = tokio::task::spawn_blocking(move || list_files(&root))
            .await
            .map_err(std::io::Error::other)??;
        Ok(names)
    }

    async fn size(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.metadata(name).await?.map(|m| m.len()))
    }

    async fn modified_time(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        match self.metadata(name).await? {
            Some(metadata) => Ok(Some(DateTime::<Utc>::from(metadata.modified()?))),
            None => Ok(None),
        }
    }

    async fn url(&self, name: &str, _expire_at: Option<DateTime<Utc>>) -> Result<String> {
        // Local links never expire
        Ok(format!("{}/{}", self.base_url, name))
    }
}
