/// Default values for configuration fields

pub const DEFAULT_OCI_CONFIG_FILE: &str = "~/.oci/config";

pub fn storage_backend() -> super::models::StorageBackend {
    super::models::StorageBackend::Oci
}

pub fn timeout_secs() -> u64 {
    60
}

pub fn url_expiry_secs() -> u64 {
    86_400  // Pre-authenticated URLs live for one day unless asked otherwise
}

pub fn local_root() -> String {
    "storage".to_string()
}

pub fn local_base_url() -> String {
    "http://localhost:8080/media".to_string()
}

pub fn oci_settings() -> super::models::OciSettings {
    super::models::OciSettings {
        config_file: String::new(),
        profile: String::new(),
        bucket: String::new(),
        compartment_id: String::new(),
        namespace: String::new(),
        endpoint: String::new(),
        timeout_secs: timeout_secs(),
        url_expiry_secs: url_expiry_secs(),
    }
}

pub fn local_settings() -> super::models::LocalSettings {
    super::models::LocalSettings {
        root: local_root(),
        base_url: local_base_url(),
    }
}

pub fn storage_settings() -> super::models::StorageSettings {
    super::models::StorageSettings {
        backend: storage_backend(),
        oci: oci_settings(),
        local: local_settings(),
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# ocistore Configuration
# ===============================================================================

[storage]
backend = "oci"                      # Storage backend: "oci" or "local"

# Oracle Cloud object storage (only used if backend = "oci")
# Empty values fall back to ORACLE_OCI_CONFIG / ORACLE_OCI_PROFILE / ORACLE_OCI_BUCKET
[storage.oci]
config_file = ""                     # OCI credentials file (default: ~/.oci/config)
profile = ""                         # Profile section inside the credentials file (e.g. "DEFAULT")
bucket = ""                          # Bucket name (created on first use if missing)
compartment_id = ""                  # Compartment for bucket creation (default: profile tenancy)
namespace = ""                       # Object storage namespace (default: looked up once)
endpoint = ""                        # Endpoint override (default: https://objectstorage.<region>.oraclecloud.com)
timeout_secs = 60                    # Transport timeout in seconds (0 = none)
url_expiry_secs = 86400              # Lifetime of pre-authenticated URLs

# Local filesystem storage (only used if backend = "local")
[storage.local]
root = "storage"                     # Directory holding stored files
base_url = "http://localhost:8080/media"  # Public base URL for file links
"#;
