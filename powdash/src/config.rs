use anyhow::{Context, Result};
use powdash_core::Metadata;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Used when neither the flags nor the config file name a URL.
pub const DEFAULT_URL: &str = "http://127.0.0.1:5002";

/// Contents of the `--config` file.
///
/// ```json
/// { "url": "http://localhost:5002", "metadata": { "x-ffs-token": "..." } }
/// ```
#[derive(Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }
}

/// Connection settings after merging the config file with the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub url: String,
    pub metadata: Metadata,
}

impl Settings {
    /// Flags win over the file: `url` replaces the file's URL and every header replaces the
    /// file's entry with the same key.
    pub fn resolve(
        url: Option<String>,
        config: Option<&Path>,
        headers: Vec<(String, String)>,
    ) -> Result<Self> {
        let file = match config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, url, headers))
    }

    fn merge(file: FileConfig, url: Option<String>, headers: Vec<(String, String)>) -> Self {
        let url = url
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_URL.to_string());

        let defaults: Metadata = file.metadata.into_iter().collect();
        let overrides: Metadata = headers.into_iter().collect();

        Self {
            url,
            metadata: defaults.merged(&overrides),
        }
    }
}
