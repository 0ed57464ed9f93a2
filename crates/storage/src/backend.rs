use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// File storage contract shared by every backend.
///
/// Application code works against `dyn Storage` and never learns whether
/// files live on a local disk or in a remote bucket.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the full content of `name`.
    ///
    /// Fails with `StorageError::FileNotFound` when nothing is stored under `name`.
    async fn open(&self, name: &str) -> Result<Bytes>;

    /// Store `content` under `name`, overwriting any existing file.
    ///
    /// Returns the name unchanged: backends never rename on collision.
    async fn save(&self, name: &str, content: Bytes) -> Result<String>;

    /// Remove `name`. Removing a missing file succeeds.
    async fn delete(&self, name: &str) -> Result<()>;

    async fn exists(&self, name: &str) -> Result<bool>;

    /// Every stored name as one flat, ordered list
    async fn listdir(&self) -> Result<Vec<String>>;

    /// Size in bytes, or `None` when the file is absent
    async fn size(&self, name: &str) -> Result<Option<u64>>;

    /// Last modification time, or `None` when the file is absent
    async fn modified_time(&self, name: &str) -> Result<Option<DateTime<Utc>>>;

    /// Public URL for `name`. Remote backends issue a time-limited link that
    /// stops working at `expire_at` (backend default when `None`).
    async fn url(&self, name: &str, expire_at: Option<DateTime<Utc>>) -> Result<String>;
}
