use crate::{Result, StorageError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use ocistore_config::OciProfile;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};

const BODY_CONTENT_TYPE: &str = "application/json";

/// Signs requests with the OCI API-key scheme (draft-cavage HTTP signatures, rsa-sha256).
pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    pub fn new(key_id: String, private_key: RsaPrivateKey) -> Self {
        Self {
            key_id,
            signing_key: SigningKey::<Sha256>::new(private_key),
        }
    }

    /// Accepts PKCS#8, encrypted PKCS#8 (with `pass_phrase`) and PKCS#1 PEM keys
    pub fn from_pem(key_id: String, pem: &str, pass_phrase: Option<&str>) -> Result<Self> {
        let key = match pass_phrase {
            Some(pass) if pem.contains("ENCRYPTED PRIVATE KEY") => {
                RsaPrivateKey::from_pkcs8_encrypted_pem(pem, pass.as_bytes())
                    .map_err(|e| StorageError::SigningError(format!("cannot decrypt key: {}", e)))?
            }
            _ if pem.contains("BEGIN RSA PRIVATE KEY") => RsaPrivateKey::from_pkcs1_pem(pem)
                .map_err(|e| StorageError::SigningError(format!("invalid PKCS#1 key: {}", e)))?,
            _ => RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|e| StorageError::SigningError(format!("invalid PKCS#8 key: {}", e)))?,
        };

        Ok(Self::new(key_id, key))
    }

    pub async fn from_profile(profile: &OciProfile) -> Result<Self> {
        let pem = tokio::fs::read_to_string(&profile.key_file).await.map_err(|e| {
            StorageError::SigningError(format!(
                "cannot read key file {}: {}",
                profile.key_file.display(),
                e
            ))
        })?;

        let key_id = format!("{}/{}/{}", profile.tenancy, profile.user, profile.fingerprint);
        Self::from_pem(key_id, &pem, profile.pass_phrase.as_deref())
    }

    /// Headers to attach to the request: `date`, `authorization`, and for
    /// requests whose body is signed, the body headers as well.
    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<HeaderMap> {
        let mut signed: Vec<(&'static str, String)> = vec![
            ("date", format_http_date(now)),
            ("(request-target)", request_target(method, url)),
            ("host", host_header(url)?),
        ];

        if let Some(body) = body.filter(|_| signs_body(method)) {
            signed.push(("content-length", body.len().to_string()));
            signed.push(("content-type", BODY_CONTENT_TYPE.to_string()));
            signed.push(("x-content-sha256", STANDARD.encode(Sha256::digest(body))));
        }

        let signature = self.signing_key.sign(signing_string(&signed).as_bytes());
        let header_names: Vec<&str> = signed.iter().map(|(name, _)| *name).collect();
        let authorization = format!(
            r#"Signature version="1",keyId="{}",algorithm="rsa-sha256",headers="{}",signature="{}""#,
            self.key_id,
            header_names.join(" "),
            STANDARD.encode(signature.to_bytes())
        );

        let mut headers = HeaderMap::new();
        for (name, value) in signed {
            // Pseudo-header and host are derived by the transport
            if name == "(request-target)" || name == "host" {
                continue;
            }
            headers.insert(HeaderName::from_static(name), header_value(&value)?);
        }
        headers.insert(reqwest::header::AUTHORIZATION, header_value(&authorization)?);

        Ok(headers)
    }
}

/// POST bodies are signed; object PUT bodies are exempt on the object storage service
fn signs_body(method: &Method) -> bool {
    *method == Method::POST
}

fn signing_string(signed: &[(&str, String)]) -> String {
    signed
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("\n")
}

fn request_target(method: &Method, url: &Url) -> String {
    let mut target = format!("{} {}", method.as_str().to_lowercase(), url.path());
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| StorageError::SigningError(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn format_http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| StorageError::SigningError(format!("invalid header value: {}", e)))
}
