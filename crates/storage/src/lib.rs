mod adapter;
mod backend;
mod client;
mod errors;
mod file;
mod local;
mod oci;
mod signer;

pub use adapter::{AdapterOptions, OracleObjectStorage};
pub use backend::Storage;
pub use client::{
    AccessType, CreateBucketDetails, CreatePreauthenticatedRequestDetails, ListObjects,
    ListObjectsRequest, ObjectStorageApi, ObjectSummary, PreauthenticatedRequest,
};
pub use errors::*;
pub use file::{FileMode, StorageFile};
pub use local::FileSystemStorage;
pub use oci::{regional_endpoint, OciClient};
pub use signer::RequestSigner;
