use crate::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a list-objects response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_modified: Option<DateTime<Utc>>,
}

impl ObjectSummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            time_created: None,
            time_modified: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjects {
    #[serde(default)]
    pub objects: Vec<ObjectSummary>,
    /// Start key of the next page, absent on the last one
    #[serde(default)]
    pub next_start_with: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsRequest {
    pub prefix: Option<String>,
    pub start: Option<String>,
    pub limit: Option<u32>,
}

impl ListObjectsRequest {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketDetails {
    pub name: String,
    pub compartment_id: String,
}

/// What a pre-authenticated request lets its holder do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AccessType {
    ObjectRead,
    ObjectWrite,
    ObjectReadWrite,
    AnyObjectRead,
    AnyObjectWrite,
    AnyObjectReadWrite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreauthenticatedRequestDetails {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    pub access_type: AccessType,
    pub time_expires: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreauthenticatedRequest {
    pub id: String,
    pub name: String,
    /// Path part of the URL, to be appended to the regional domain
    pub access_uri: String,
    #[serde(default)]
    pub object_name: Option<String>,
    pub access_type: AccessType,
    pub time_expires: DateTime<Utc>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
}

/// The object storage calls the adapter is built on.
///
/// `OciClient` speaks to the real service; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStorageApi: Send + Sync {
    /// Tenancy-scoped namespace every other call needs
    async fn get_namespace(&self) -> Result<String>;

    async fn head_bucket(&self, namespace: &str, bucket: &str) -> Result<()>;

    /// Only the status matters; the created bucket's description is discarded
    async fn create_bucket(&self, namespace: &str, details: CreateBucketDetails) -> Result<()>;

    async fn get_object(&self, namespace: &str, bucket: &str, object: &str) -> Result<Bytes>;

    async fn put_object(&self, namespace: &str, bucket: &str, object: &str, body: Bytes) -> Result<()>;

    async fn delete_object(&self, namespace: &str, bucket: &str, object: &str) -> Result<()>;

    async fn list_objects(
        &self,
        namespace: &str,
        bucket: &str,
        request: ListObjectsRequest,
    ) -> Result<ListObjects>;

    async fn create_preauthenticated_request(
        &self,
        namespace: &str,
        bucket: &str,
        details: CreatePreauthenticatedRequestDetails,
    ) -> Result<PreauthenticatedRequest>;
}
