use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::render::Renderer;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Optional settings file; command line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: Option<String>,
    pub service: Option<String>,
    pub track: Option<String>,
    pub zoom: bool,
    #[serde(deserialize_with = "deserialize_interval")]
    pub interval: Option<u64>,
    pub renderer: Option<Renderer>,
    pub extra: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub global_config: Option<PathBuf>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Accepts whole seconds (`30`) or a humantime duration (`"1m 30s"`).
fn deserialize_interval<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Interval {
        Seconds(u64),
        Text(String),
    }

    match Option::<Interval>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Interval::Seconds(secs)) => Ok(Some(secs)),
        Some(Interval::Text(text)) => match text.trim().parse() {
            Ok(secs) => Ok(Some(secs)),
            Err(_) => humantime::parse_duration(text.trim())
                .map(|d| Some(d.as_secs()))
                .map_err(serde::de::Error::custom),
        },
    }
}
