// Configuration loading

pub mod error;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use loader::{load, resolve_config_path, ConfigFormat};
pub use settings::{
    Config, MatchMode, PageSettings, ProviderConfig, RegistryConfig, TlsSettings,
};
