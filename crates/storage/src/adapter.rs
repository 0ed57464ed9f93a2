use crate::backend::Storage;
use crate::client::{
    AccessType, CreateBucketDetails, CreatePreauthenticatedRequestDetails, ListObjectsRequest,
    ObjectStorageApi, ObjectSummary,
};
use crate::oci::{regional_endpoint, OciClient};
use crate::{Result, StorageError};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use ocistore_config::{ConfigError, OciProfile, OciSettings, ResolvedOciSettings};
use tokio::sync::OnceCell;

/// Everything the adapter needs besides a client
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub bucket: String,
    pub region: String,
    /// Compartment new buckets are created in
    pub compartment_id: String,
    /// Skips the namespace lookup when known up front
    pub namespace: Option<String>,
    /// Replaces the regional domain, both for API calls and issued URLs
    pub endpoint: Option<String>,
    pub url_expiry: TimeDelta,
}

impl AdapterOptions {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>, compartment_id: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            compartment_id: compartment_id.into(),
            namespace: None,
            endpoint: None,
            url_expiry: TimeDelta::days(1),
        }
    }
}

/// Oracle Cloud object storage behind the [`Storage`] contract.
///
/// The bucket is checked (and created if missing) at construction. The
/// namespace is looked up once and memoized for the adapter's lifetime; it is
/// never invalidated. Object metadata is not cached: every `exists`, `size`
/// and `modified_time` call lists the bucket again.
pub struct OracleObjectStorage<C: ObjectStorageApi = OciClient> {
    client: C,
    bucket: String,
    region: String,
    compartment_id: String,
    endpoint: Option<String>,
    url_expiry: TimeDelta,
    namespace: OnceCell<String>,
}

impl OracleObjectStorage<OciClient> {
    pub async fn from_settings(settings: &OciSettings) -> Result<Self> {
        let resolved = settings.resolve()?;
        Self::from_resolved(&resolved).await
    }

    pub async fn from_resolved(resolved: &ResolvedOciSettings) -> Result<Self> {
        let profile = OciProfile::from_file(&resolved.config_file, &resolved.profile).await?;
        let client = OciClient::from_profile(
            &profile,
            resolved.endpoint.as_deref(),
            resolved.timeout_secs,
        )
        .await?;

        let options = AdapterOptions {
            bucket: resolved.bucket.clone(),
            region: profile.region.clone(),
            compartment_id: resolved
                .compartment_id
                .clone()
                .unwrap_or_else(|| profile.tenancy.clone()),
            namespace: resolved.namespace.clone(),
            endpoint: resolved.endpoint.clone(),
            url_expiry: TimeDelta::seconds(resolved.url_expiry_secs as i64),
        };

        Self::with_client(client, options).await
    }
}

impl<C: ObjectStorageApi> OracleObjectStorage<C> {
    pub async fn with_client(client: C, options: AdapterOptions) -> Result<Self> {
        if options.bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket.into());
        }
        if options.region.trim().is_empty() && options.endpoint.is_none() {
            return Err(ConfigError::InvalidConfig("no region or endpoint configured".to_string()).into());
        }
        if options.compartment_id.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("no compartment configured".to_string()).into());
        }

        let storage = Self {
            client,
            bucket: options.bucket,
            region: options.region,
            compartment_id: options.compartment_id,
            endpoint: options.endpoint,
            url_expiry: options.url_expiry,
            namespace: OnceCell::new_with(options.namespace),
        };

        storage.ensure_bucket().await?;
        let namespace = storage.namespace().await?;
        tracing::info!(
            "Initialized Oracle object storage: bucket={}, namespace={}",
            storage.bucket,
            namespace
        );

        Ok(storage)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn regional_domain(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => regional_endpoint(&self.region),
        }
    }

    pub async fn namespace(&self) -> Result<&str> {
        self.namespace
            .get_or_try_init(|| self.client.get_namespace())
            .await
            .map(String::as_str)
    }

    /// Like [`Storage::url`], also returning the expiry that was requested
    pub async fn url_with_expiry(
        &self,
        name: &str,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<(String, DateTime<Utc>)> {
        let time_expires = expire_at.unwrap_or_else(|| Utc::now() + self.url_expiry);
        let namespace = self.namespace().await?;

        let details = CreatePreauthenticatedRequestDetails {
            name: name.to_string(),
            object_name: Some(name.to_string()),
            access_type: AccessType::ObjectRead,
            time_expires,
        };
        let request = self
            .client
            .create_preauthenticated_request(namespace, &self.bucket, details)
            .await?;

        tracing::debug!("Issued read URL for {} until {}", name, time_expires);
        Ok((format!("{}{}", self.regional_domain(), request.access_uri), time_expires))
    }

    async fn ensure_bucket(&self) -> Result<()> {
        let namespace = self.namespace().await?;

        match self.client.head_bucket(namespace, &self.bucket).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "Bucket {} not found, creating it in compartment {}",
                    self.bucket,
                    self.compartment_id
                );
                let details = CreateBucketDetails {
                    name: self.bucket.clone(),
                    compartment_id: self.compartment_id.clone(),
                };
                self.client.create_bucket(namespace, details).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn metadata(&self, name: &str) -> Result<Option<ObjectSummary>> {
        let namespace = self.namespace().await?;
        let page = self
            .client
            .list_objects(namespace, &self.bucket, metadata_request(name))
            .await?;

        Ok(single_match(page.objects, name))
    }
}

/// Two hits are enough to tell "exactly one" from "several"
fn metadata_request(name: &str) -> ListObjectsRequest {
    ListObjectsRequest {
        limit: Some(2),
        ..ListObjectsRequest::with_prefix(name)
    }
}

/// A prefix listing only identifies `name` when it returns exactly one object
/// and that object is `name` itself. Several hits count as "not found".
fn single_match(objects: Vec<ObjectSummary>, name: &str) -> Option<ObjectSummary> {
    match <[ObjectSummary; 1]>::try_from(objects) {
        Ok([object]) if object.name == name => Some(object),
        _ => None,
    }
}

#[async_trait::async_trait]
impl<C: ObjectStorageApi> Storage for OracleObjectStorage<C> {
    async fn open(&self, name: &str) -> Result<Bytes> {
        let namespace = self.namespace().await?;

        self.client
            .get_object(namespace, &self.bucket, name)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    StorageError::FileNotFound(name.to_string())
                } else {
                    e
                }
            })
    }

    async fn save(&self, name: &str, content: Bytes) -> Result<String> {
        let namespace = self.namespace().await?;
        let size = content.len();

        self.client.put_object(namespace, &self.bucket, name, content).await?;

        tracing::info!("Saved {} ({} bytes) to bucket {}", name, size, self.bucket);
        Ok(name.to_string())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let namespace = self.namespace().await?;

        match self.client.delete_object(namespace, &self.bucket, name).await {
            Ok(()) => {
                tracing::info!("Deleted {} from bucket {}", name, self.bucket);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("Delete of missing object {} ignored", name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.metadata(name).await?.is_some())
    }

    async fn listdir(&self) -> Result<Vec<String>> {
        let namespace = self.namespace().await?;
        let mut names = Vec::new();
        let mut start = None;

        loop {
            let request = ListObjectsRequest {
                start: start.take(),
                ..ListObjectsRequest::default()
            };
            let page = self.client.list_objects(namespace, &self.bucket, request).await?;
            names.extend(page.objects.into_iter().map(|o| o.name));

            match page.next_start_with {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn size(&self, name: &str) -> Result<Option<u64>> {
        Ok(self.metadata(name).await?.and_then(|o| o.size))
    }

    async fn modified_time(&self, name: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.metadata(name).await?.and_then(|o| o.time_modified))
    }

    async fn url(&self, name: &str, expire_at: Option<DateTime<Utc>>) -> Result<String> {
        Ok(self.url_with_expiry(name, expire_at).await?.0)
    }
}

impl<C: ObjectStorageApi> Drop for OracleObjectStorage<C> {
    fn drop(&mut self) {
        tracing::debug!("Releasing object storage connection for bucket {}", self.bucket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ListObjects, MockObjectStorageApi, PreauthenticatedRequest};
    use crate::ServiceError;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    fn service_error(status: u16, code: &str) -> StorageError {
        ServiceError {
            status,
            code: code.to_string(),
            message: String::new(),
            request_id: None,
        }
        .into()
    }

    fn options() -> AdapterOptions {
        AdapterOptions::new("media", "us-ashburn-1", "ocid1.tenancy.oc1..aaaa")
    }

    /// Bucket-backed fake that pages listings `page_size` objects at a time
    struct MemoryApi {
        objects: Mutex<BTreeMap<String, (Bytes, DateTime<Utc>)>>,
        page_size: usize,
    }

    impl MemoryApi {
        fn new(page_size: usize) -> Self {
            Self {
                objects: Mutex::new(BTreeMap::new()),
                page_size,
            }
        }
    }

    #[async_trait::async_trait]
    impl ObjectStorageApi for MemoryApi {
        async fn get_namespace(&self) -> Result<String> {
            Ok("ns".to_string())
        }

        async fn head_bucket(&self, _namespace: &str, _bucket: &str) -> Result<()> {
            Ok(())
        }

        async fn create_bucket(&self, _namespace: &str, _details: CreateBucketDetails) -> Result<()> {
            Ok(())
        }

        async fn get_object(&self, _namespace: &str, _bucket: &str, object: &str) -> Result<Bytes> {
            let objects = self.objects.lock().unwrap();
            match objects.get(object) {
                Some((content, _)) => Ok(content.clone()),
                None => Err(service_error(404, "ObjectNotFound")),
            }
        }

        async fn put_object(&self, _namespace: &str, _bucket: &str, object: &str, body: Bytes) -> Result<()> {
            self.objects
                .lock()
                .unwrap()
                .insert(object.to_string(), (body, Utc::now()));
            Ok(())
        }

        async fn delete_object(&self, _namespace: &str, _bucket: &str, object: &str) -> Result<()> {
            match self.objects.lock().unwrap().remove(object) {
                Some(_) => Ok(()),
                None => Err(service_error(404, "ObjectNotFound")),
            }
        }

        async fn list_objects(
            &self,
            _namespace: &str,
            _bucket: &str,
            request: ListObjectsRequest,
        ) -> Result<ListObjects> {
            let objects = self.objects.lock().unwrap();
            let prefix = request.prefix.unwrap_or_default();
            let start = request.start.unwrap_or_default();

            let mut matching = objects
                .iter()
                .filter(|(name, _)| name.starts_with(&prefix) && name.as_str() >= start.as_str());
            let page: Vec<ObjectSummary> = matching
                .by_ref()
                .take(request.limit.map_or(self.page_size, |l| l as usize))
                .map(|(name, (content, modified))| ObjectSummary {
                    name: name.clone(),
                    size: Some(content.len() as u64),
                    time_created: Some(*modified),
                    time_modified: Some(*modified),
                })
                .collect();

            Ok(ListObjects {
                objects: page,
                next_start_with: matching.next().map(|(name, _)| name.clone()),
            })
        }

        async fn create_preauthenticated_request(
            &self,
            _namespace: &str,
            _bucket: &str,
            details: CreatePreauthenticatedRequestDetails,
        ) -> Result<PreauthenticatedRequest> {
            Ok(PreauthenticatedRequest {
                id: "par-1".to_string(),
                name: details.name.clone(),
                access_uri: format!("/p/token/n/ns/b/media/o/{}", details.name),
                object_name: details.object_name,
                access_type: details.access_type,
                time_expires: details.time_expires,
                time_created: None,
            })
        }
    }

    async fn memory_storage(page_size: usize) -> OracleObjectStorage<MemoryApi> {
        OracleObjectStorage::with_client(MemoryApi::new(page_size), options())
            .await
            .unwrap()
    }

    fn mock_with_bucket() -> MockObjectStorageApi {
        let mut api = MockObjectStorageApi::new();
        api.expect_get_namespace()
            .times(1)
            .returning(|| Ok("ns".to_string()));
        api.expect_head_bucket().times(1).returning(|_, _| Ok(()));
        api.expect_create_bucket().times(0);
        api
    }

    #[tokio::test]
    async fn test_existing_bucket_is_not_created() {
        let storage = OracleObjectStorage::with_client(mock_with_bucket(), options())
            .await
            .unwrap();

        assert_eq!(storage.bucket(), "media");
        assert_eq!(storage.namespace().await.unwrap(), "ns");
    }

    #[tokio::test]
    async fn test_missing_bucket_is_created_once() {
        let mut api = MockObjectStorageApi::new();
        api.expect_get_namespace()
            .times(1)
            .returning(|| Ok("ns".to_string()));
        api.expect_head_bucket()
            .times(1)
            .returning(|_, _| Err(service_error(404, "BucketNotFound")));
        api.expect_create_bucket()
            .withf(|namespace, details| {
                namespace == "ns"
                    && details.name == "media"
                    && details.compartment_id == "ocid1.tenancy.oc1..aaaa"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_put_object()
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let storage = OracleObjectStorage::with_client(api, options()).await.unwrap();

        // Usable right after creation
        let saved = storage.save("a.txt", Bytes::from_static(b"x")).await.unwrap();
        assert_eq!(saved, "a.txt");
    }

    #[tokio::test]
    async fn test_bucket_check_error_propagates() {
        let mut api = MockObjectStorageApi::new();
        api.expect_get_namespace()
            .returning(|| Ok("ns".to_string()));
        api.expect_head_bucket()
            .returning(|_, _| Err(service_error(401, "NotAuthenticated")));
        api.expect_create_bucket().times(0);

        let err = OracleObjectStorage::with_client(api, options()).await.err().unwrap();

        match err {
            StorageError::ServiceError(e) => assert_eq!(e.status, 401),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_bucket_name_is_config_error() {
        let mut options = options();
        options.bucket = String::new();

        let err = OracleObjectStorage::with_client(MockObjectStorageApi::new(), options)
            .await
            .err()
            .unwrap();

        assert!(matches!(
            err,
            StorageError::ConfigError(ConfigError::MissingBucket)
        ));
    }

    #[tokio::test]
    async fn test_namespace_looked_up_once() {
        let mut api = mock_with_bucket();
        api.expect_list_objects()
            .withf(|_, _, request| {
                request.prefix.as_deref() == Some("a") && request.limit == Some(2)
            })
            .times(3)
            .returning(|_, _, _| Ok(ListObjects::default()));

        let storage = OracleObjectStorage::with_client(api, options()).await.unwrap();

        assert!(!storage.exists("a").await.unwrap());
        assert_eq!(storage.size("a").await.unwrap(), None);
        assert_eq!(storage.modified_time("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_preset_namespace_skips_lookup() {
        let mut api = MockObjectStorageApi::new();
        api.expect_get_namespace().times(0);
        api.expect_head_bucket()
            .withf(|namespace, bucket| namespace == "preset" && bucket == "media")
            .returning(|_, _| Ok(()));

        let mut options = options();
        options.namespace = Some("preset".to_string());

        let storage = OracleObjectStorage::with_client(api, options).await.unwrap();
        assert_eq!(storage.namespace().await.unwrap(), "preset");
    }

    #[tokio::test]
    async fn test_exists_requires_single_exact_match() {
        let storage = memory_storage(100).await;
        for name in ["a.txt", "a.txt.bak", "b.txt", "docs/readme.md"] {
            storage.save(name, Bytes::from_static(b"data")).await.unwrap();
        }

        assert!(storage.exists("b.txt").await.unwrap());
        assert!(storage.exists("docs/readme.md").await.unwrap());
        // Zero hits
        assert!(!storage.exists("c.txt").await.unwrap());
        // Two prefix hits are reported as absent, not as an ambiguity
        assert!(!storage.exists("a.txt").await.unwrap());
        // One hit that is only a longer key
        assert!(!storage.exists("docs/readme").await.unwrap());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let storage = memory_storage(100).await;

        let contents: [&[u8]; 3] = [b"", b"hello", &[0, 255, 10, 13]];
        for content in contents {
            storage.save("blob.bin", Bytes::copy_from_slice(content)).await.unwrap();
            assert_eq!(storage.open("blob.bin").await.unwrap(), content);
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_and_keeps_name() {
        let storage = memory_storage(100).await;

        let first = storage.save("report.pdf", Bytes::from_static(b"v1")).await.unwrap();
        let second = storage.save("report.pdf", Bytes::from_static(b"v2")).await.unwrap();

        assert_eq!(first, "report.pdf");
        assert_eq!(second, "report.pdf");
        assert_eq!(storage.listdir().await.unwrap(), vec!["report.pdf"]);
        assert_eq!(storage.open("report.pdf").await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let storage = memory_storage(100).await;

        let err = storage.open("missing.txt").await.unwrap_err();

        assert!(matches!(err, StorageError::FileNotFound(ref name) if name == "missing.txt"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let storage = memory_storage(100).await;
        storage.save("a.txt", Bytes::from_static(b"a")).await.unwrap();

        storage.delete("a.txt").await.unwrap();
        storage.delete("a.txt").await.unwrap();

        assert!(!storage.exists("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_other_errors_propagate() {
        let mut api = mock_with_bucket();
        api.expect_delete_object()
            .returning(|_, _, _| Err(service_error(403, "NotAuthorized")));

        let storage = OracleObjectStorage::with_client(api, options()).await.unwrap();

        let err = storage.delete("a.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::ServiceError(ref e) if e.status == 403));
    }

    #[tokio::test]
    async fn test_size_and_modified_time() {
        let storage = memory_storage(100).await;
        let before = Utc::now();
        storage.save("a.txt", Bytes::from_static(b"12345")).await.unwrap();

        assert_eq!(storage.size("a.txt").await.unwrap(), Some(5));
        let modified = storage.modified_time("a.txt").await.unwrap().unwrap();
        assert!(modified >= before);

        assert_eq!(storage.size("missing").await.unwrap(), None);
        assert_eq!(storage.modified_time("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_listdir_follows_pagination() {
        let storage = memory_storage(2).await;
        for name in ["e", "a", "d", "b", "c"] {
            storage.save(name, Bytes::new()).await.unwrap();
        }

        assert_eq!(storage.listdir().await.unwrap(), vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_url_defaults_to_one_day() {
        let mut api = mock_with_bucket();
        api.expect_create_preauthenticated_request()
            .withf(|_, bucket, details| {
                bucket == "media"
                    && details.access_type == AccessType::ObjectRead
                    && details.object_name.as_deref() == Some("a.txt")
            })
            .returning(|_, _, details| {
                Ok(PreauthenticatedRequest {
                    id: "par".to_string(),
                    name: details.name,
                    access_uri: "/p/abc/n/ns/b/media/o/a.txt".to_string(),
                    object_name: details.object_name,
                    access_type: details.access_type,
                    time_expires: details.time_expires,
                    time_created: None,
                })
            });

        let storage = OracleObjectStorage::with_client(api, options()).await.unwrap();

        let before = Utc::now();
        let (url, expires) = storage.url_with_expiry("a.txt", None).await.unwrap();
        let after = Utc::now();

        assert_eq!(
            url,
            "https://objectstorage.us-ashburn-1.oraclecloud.com/p/abc/n/ns/b/media/o/a.txt"
        );
        assert!(expires >= before + TimeDelta::hours(24));
        assert!(expires <= after + TimeDelta::hours(24));
    }

    #[tokio::test]
    async fn test_url_explicit_expiry_and_endpoint() {
        let mut options = options();
        options.endpoint = Some("http://127.0.0.1:9000".to_string());
        let storage = OracleObjectStorage::with_client(MemoryApi::new(100), options)
            .await
            .unwrap();

        let expire_at: DateTime<Utc> = "2030-01-01T00:00:00Z".parse().unwrap();
        let (url, expires) = storage.url_with_expiry("a.txt", Some(expire_at)).await.unwrap();

        assert_eq!(expires, expire_at);
        assert_eq!(url, "http://127.0.0.1:9000/p/token/n/ns/b/media/o/a.txt");
        assert_eq!(storage.url("a.txt", None).await.unwrap(), url);
    }
}
