// Re-export all public APIs from the workspace crates

pub use ocistore_config::*;
pub use ocistore_storage::*;

/// Prelude module for convenient imports
pub mod prelude {
    // Configuration
    pub use ocistore_config::{Config, OciSettings, StorageBackend};

    // Storage contract and backends
    pub use ocistore_storage::{FileSystemStorage, OracleObjectStorage, Storage};

    // File handles
    pub use ocistore_storage::{FileMode, StorageFile};

    // Errors
    pub use ocistore_storage::StorageError;
}
