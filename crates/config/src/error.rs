use std::path::PathBuf;

/// Configuration failures. All of them are fatal and surface before any
/// network call is made.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format {} (expected .yaml, .yml or .toml)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("no config file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("missing required field '{section}.{field}'")]
    Missing {
        section: &'static str,
        field: &'static str,
    },

    #[error("invalid '{field}': {message}")]
    Invalid { field: String, message: String },

    #[error("unrecognized provider '{0}'")]
    UnknownProvider(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
