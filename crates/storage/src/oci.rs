use crate::client::{
    CreateBucketDetails, CreatePreauthenticatedRequestDetails, ListObjects,
    ListObjectsRequest, ObjectStorageApi, PreauthenticatedRequest,
};
use crate::signer::RequestSigner;
use crate::{Result, ServiceError, StorageError};
use bytes::Bytes;
use chrono::Utc;
use ocistore_config::OciProfile;
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const LIST_FIELDS: &str = "name,size,timeCreated,timeModified";

/// Regional object storage endpoint, e.g. `https://objectstorage.us-ashburn-1.oraclecloud.com`
pub fn regional_endpoint(region: &str) -> String {
    format!("https://objectstorage.{}.oraclecloud.com", region)
}

/// Oracle Cloud object storage REST client
pub struct OciClient {
    client: reqwest::Client,
    endpoint: Url,
    signer: RequestSigner,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl OciClient {
    pub fn new(endpoint: &str, signer: RequestSigner, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            StorageError::ConfigError(ocistore_config::ConfigError::InvalidConfig(format!(
                "invalid endpoint '{}': {}",
                endpoint, e
            )))
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            signer,
        })
    }

    /// Builds a client from a credentials profile; `endpoint` overrides the regional default
    pub async fn from_profile(
        profile: &OciProfile,
        endpoint: Option<&str>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let signer = RequestSigner::from_profile(profile).await?;
        let endpoint = endpoint
            .map(str::to_string)
            .unwrap_or_else(|| regional_endpoint(&profile.region));
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        tracing::debug!("Object storage endpoint: {}", endpoint);
        Self::new(&endpoint, signer, timeout)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StorageError::ConfigError(ocistore_config::ConfigError::InvalidConfig(format!(
                    "endpoint cannot be a base URL: {}",
                    self.endpoint
                )))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Dot segments would be normalized away, addressing the `/o` collection instead
    fn object_url(&self, namespace: &str, bucket: &str, object: &str) -> Result<Url> {
        if matches!(object, "" | "." | "..") {
            return Err(StorageError::InvalidName(object.to_string()));
        }
        self.url(&["n", namespace, "b", bucket, "o", object])
    }

    async fn send(&self, method: Method, url: Url, body: Option<Bytes>) -> Result<Response> {
        let headers = self.signer.sign(&method, &url, body.as_deref(), Utc::now())?;

        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get("opc-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.unwrap_or_default();

        Err(parse_service_error(status, request_id, &text).into())
    }

    async fn send_json<T: serde::Serialize>(&self, url: Url, body: &T) -> Result<Response> {
        let body = Bytes::from(serde_json::to_vec(body)?);
        self.send(Method::POST, url, Some(body)).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn parse_service_error(status: u16, request_id: Option<String>, text: &str) -> ServiceError {
    let (code, message) = match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => (body.code, body.message),
        Err(_) => {
            let reason = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown");
            (reason.replace(' ', ""), text.to_string())
        }
    };

    ServiceError {
        status,
        code,
        message,
        request_id,
    }
}

#[async_trait::async_trait]
impl ObjectStorageApi for OciClient {
    async fn get_namespace(&self) -> Result<String> {
        let url = self.url(&["n", ""])?;
        decode(self.send(Method::GET, url, None).await?).await
    }

    async fn head_bucket(&self, namespace: &str, bucket: &str) -> Result<()> {
        let url = self.url(&["n", namespace, "b", bucket])?;
        self.send(Method::HEAD, url, None).await?;
        Ok(())
    }

    async fn create_bucket(&self, namespace: &str, details: CreateBucketDetails) -> Result<()> {
        let url = self.url(&["n", namespace, "b", ""])?;
        self.send_json(url, &details).await?;
        Ok(())
    }

    async fn get_object(&self, namespace: &str, bucket: &str, object: &str) -> Result<Bytes> {
        let url = self.object_url(namespace, bucket, object)?;
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.bytes().await?)
    }

    async fn put_object(&self, namespace: &str, bucket: &str, object: &str, body: Bytes) -> Result<()> {
        let url = self.object_url(namespace, bucket, object)?;
        self.send(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    async fn delete_object(&self, namespace: &str, bucket: &str, object: &str) -> Result<()> {
        let url = self.object_url(namespace, bucket, object)?;
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn list_objects(
        &self,
        namespace: &str,
        bucket: &str,
        request: ListObjectsRequest,
    ) -> Result<ListObjects> {
        let mut url = self.url(&["n", namespace, "b", bucket, "o"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(prefix) = &request.prefix {
                query.append_pair("prefix", prefix);
            }
            if let Some(start) = &request.start {
                query.append_pair("start", start);
            }
            if let Some(limit) = request.limit {
                query.append_pair("limit", &limit.to_string());
            }
            // Without explicit fields the service only returns names
            query.append_pair("fields", LIST_FIELDS);
        }
        decode(self.send(Method::GET, url, None).await?).await
    }

    async fn create_preauthenticated_request(
        &self,
        namespace: &str,
        bucket: &str,
        details: CreatePreauthenticatedRequestDetails,
    ) -> Result<PreauthenticatedRequest> {
        let url = self.url(&["n", namespace, "b", bucket, "p", ""])?;
        decode(self.send_json(url, &details).await?).await
    }
}
