use super::errors::ConfigError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_SECTION: &str = "DEFAULT";

/// A single profile from an OCI credentials file (`~/.oci/config`).
///
/// The file is INI-style: `[NAME]` sections of `key=value` lines. Keys set in
/// the `DEFAULT` section are inherited by every other profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciProfile {
    pub name: String,
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: String,
    pub pass_phrase: Option<String>,
}

impl OciProfile {
    pub async fn from_file<P: AsRef<Path>>(path: P, profile: &str) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content, profile, path)
    }

    pub fn parse(content: &str, profile: &str, origin: &Path) -> Result<Self, ConfigError> {
        let sections = parse_sections(content);

        let mut values = sections.get(DEFAULT_SECTION).cloned().unwrap_or_default();
        match sections.get(profile) {
            Some(section) => values.extend(section.clone()),
            None if profile == DEFAULT_SECTION && !values.is_empty() => {}
            None => {
                return Err(ConfigError::ProfileNotFound {
                    profile: profile.to_string(),
                    path: origin.display().to_string(),
                })
            }
        }

        let required = |key: &str| {
            values
                .get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| ConfigError::MissingProfileKey {
                    profile: profile.to_string(),
                    key: key.to_string(),
                })
        };

        Ok(Self {
            name: profile.to_string(),
            user: required("user")?,
            fingerprint: required("fingerprint")?,
            key_file: expand_home(&required("key_file")?),
            tenancy: required("tenancy")?,
            region: required("region")?,
            pass_phrase: values.get("pass_phrase").filter(|v| !v.is_empty()).cloned(),
        })
    }
}

fn parse_sections(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        // Lines outside a section are ignored, like the SDK parsers do
        let (Some(section), Some((key, value))) = (current.as_ref(), line.split_once('=')) else {
            continue;
        };
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_string(), value.trim().to_string());
    }

    sections
}

/// Expands a leading `~` to the user's home directory
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
