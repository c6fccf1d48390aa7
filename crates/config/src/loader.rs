// Config file discovery and parsing

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::settings::{Config, ConfigDocument};

/// On-disk format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Candidate locations when no path is given explicitly.
fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("config.yaml"), PathBuf::from("config.toml")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("catalink").join("config.yaml"));
        candidates.push(dir.join("catalink").join("config.toml"));
    }
    candidates
}

/// Explicit path wins; otherwise the first existing default candidate.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let searched = default_candidates();
    searched
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(ConfigError::NotFound { searched })
}

/// Read, parse and validate a config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(path, &contents, format, |name| std::env::var(name).ok())?;
    tracing::debug!(path = %path.display(), provider = %config.provider.id, "config loaded");
    Ok(config)
}

pub(crate) fn parse(
    path: &Path,
    contents: &str,
    format: ConfigFormat,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let document: ConfigDocument = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
    };

    document.validate(env)
}
