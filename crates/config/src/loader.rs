use super::defaults::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_OCI_CONFIG_FILE};
use super::errors::ConfigError;
use super::models::{Config, OciSettings, ResolvedOciSettings};
use super::profile::expand_home;
use std::path::Path;

pub const ENV_OCI_CONFIG: &str = "ORACLE_OCI_CONFIG";
pub const ENV_OCI_PROFILE: &str = "ORACLE_OCI_PROFILE";
pub const ENV_OCI_BUCKET: &str = "ORACLE_OCI_BUCKET";

impl Config {
    /// Loads configuration from a file, writing the default template first if it is missing
    pub async fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            create_default_config(path).await?;
            tracing::warn!("Configuration file not found");
            tracing::info!("Created default configuration at: {}", path.display());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl OciSettings {
    /// Applies the `ORACLE_OCI_*` environment fallbacks and validates the result
    pub fn resolve(&self) -> Result<ResolvedOciSettings, ConfigError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Same as [`OciSettings::resolve`] with an injectable environment lookup
    pub fn resolve_with<F>(&self, env: F) -> Result<ResolvedOciSettings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_file = non_empty(&self.config_file)
            .or_else(|| env(ENV_OCI_CONFIG).and_then(|v| non_empty(&v)))
            .unwrap_or_else(|| DEFAULT_OCI_CONFIG_FILE.to_string());

        let profile = non_empty(&self.profile)
            .or_else(|| env(ENV_OCI_PROFILE).and_then(|v| non_empty(&v)))
            .ok_or(ConfigError::MissingProfile)?;

        let bucket = non_empty(&self.bucket)
            .or_else(|| env(ENV_OCI_BUCKET).and_then(|v| non_empty(&v)))
            .ok_or(ConfigError::MissingBucket)?;

        Ok(ResolvedOciSettings {
            config_file: expand_home(&config_file),
            profile,
            bucket,
            compartment_id: non_empty(&self.compartment_id),
            namespace: non_empty(&self.namespace),
            endpoint: non_empty(&self.endpoint).map(|e| e.trim_end_matches('/').to_string()),
            timeout_secs: self.timeout_secs,
            url_expiry_secs: self.url_expiry_secs,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Creates a default configuration file
async fn create_default_config<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}
