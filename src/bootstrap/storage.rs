use anyhow::Result;
use ocistore::prelude::{Config, FileSystemStorage, OracleObjectStorage, Storage, StorageBackend};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn initialize(config: &Config) -> Result<Arc<dyn Storage>> {
    match config.storage.backend {
        StorageBackend::Local => {
            let backend = FileSystemStorage::new(
                config.storage.local.base_url.clone(),
                PathBuf::from(&config.storage.local.root),
            );

            tracing::debug!("Initialized local storage backend: root={}", config.storage.local.root);
            Ok(Arc::new(backend) as Arc<dyn Storage>)
        }
        StorageBackend::Oci => {
            let backend = OracleObjectStorage::from_settings(&config.storage.oci).await?;
            Ok(Arc::new(backend) as Arc<dyn Storage>)
        }
    }
}
