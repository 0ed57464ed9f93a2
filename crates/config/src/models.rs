use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "super::defaults::storage_settings")]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "super::defaults::storage_backend")]
    pub backend: StorageBackend,
    #[serde(default = "super::defaults::oci_settings")]
    pub oci: OciSettings,
    #[serde(default = "super::defaults::local_settings")]
    pub local: LocalSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Oci,
    Local,
}

/// Oracle Cloud object storage settings as written in the config file.
///
/// Empty strings mean "not set"; see [`OciSettings::resolve`] for the fallback chain.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OciSettings {
    #[serde(default)]
    pub config_file: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub compartment_id: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "super::defaults::timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "super::defaults::url_expiry_secs")]
    pub url_expiry_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalSettings {
    #[serde(default = "super::defaults::local_root")]
    pub root: String,
    #[serde(default = "super::defaults::local_base_url")]
    pub base_url: String,
}

/// OCI settings after environment fallbacks have been applied and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOciSettings {
    pub config_file: std::path::PathBuf,
    pub profile: String,
    pub bucket: String,
    pub compartment_id: Option<String>,
    pub namespace: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub url_expiry_secs: u64,
}
