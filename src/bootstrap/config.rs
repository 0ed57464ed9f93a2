use anyhow::Result;
use ocistore::prelude::Config;
use std::path::Path;

pub async fn load(config_path: &str) -> Result<Config> {
    let config = Config::from_file(config_path).await?;

    let abs_config_path = std::fs::canonicalize(Path::new(config_path))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| config_path.to_string());
    tracing::debug!("Loaded configuration from {}", abs_config_path);

    Ok(config)
}
