use ocistore_config::ConfigError;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid storage configuration: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Object storage service error: {0}")]
    ServiceError(ServiceError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Access violation on '{0}': file was opened for read-only access")]
    AccessViolation(String),

    #[error("I/O operation on closed file '{0}'")]
    FileClosed(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("HTTP transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("Request signing failed: {0}")]
    SigningError(String),

    #[error("Malformed service response: {0}")]
    DecodeError(#[from] serde_json::Error),
}

impl StorageError {
    /// True for both a missing file and a 404 coming back from the service
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::FileNotFound(_) => true,
            StorageError::ServiceError(e) => e.is_not_found(),
            StorageError::IoError(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<ServiceError> for StorageError {
    fn from(error: ServiceError) -> Self {
        StorageError::ServiceError(error)
    }
}

/// A non-2xx answer from the object storage service, carried unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.code, self.message)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (opc-request-id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}
