use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Oracle OCI - No Profile Specified")]
    MissingProfile,

    #[error("Oracle OCI - No Bucket Specified")]
    MissingBucket,

    #[error("Profile '{profile}' not found in {path}")]
    ProfileNotFound { profile: String, path: String },

    #[error("Profile '{profile}' is missing required key '{key}'")]
    MissingProfileKey { profile: String, key: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
