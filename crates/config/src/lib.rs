mod models;
mod defaults;
mod loader;
mod profile;
mod errors;

pub use models::*;
pub use profile::{expand_home, OciProfile};
pub use errors::ConfigError;
pub use loader::{ENV_OCI_BUCKET, ENV_OCI_CONFIG, ENV_OCI_PROFILE};
