// Registry and provider settings
// Parsed from config.yaml / config.toml, then validated into immutable structs

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const API_KEY_ENV: &str = "IMMUTA_API_KEY";
pub const PASSWORD_ENV: &str = "COLLIBRA_PASSWORD";

// ── Validated config ────────────────────────────────────────────────

/// Validated configuration. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: RegistryConfig,
    pub provider: ProviderConfig,
}

/// Registry A (the governance registry holding the records to link).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub url: String,
    pub api_key: String,
    pub paging: PageSettings,
    pub tls: TlsSettings,
}

/// Registry B (the external catalog searched for matches).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider tag, selects the concrete provider ("collibra").
    pub id: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub asset_type_ids: Vec<String>,
    pub paging: PageSettings,
    pub match_mode: MatchMode,
    pub match_prefix: String,
    pub tls: TlsSettings,
}

/// Page size and inter-page wait. `limit == 0` means one page at the
/// server's default size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSettings {
    pub limit: u32,
    pub throttle: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    /// PEM file added as an extra trusted root.
    pub ca_path: Option<PathBuf>,
    /// Skip certificate verification entirely.
    pub insecure: bool,
}

/// Name comparison used when searching the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    #[default]
    #[serde(rename = "exact", alias = "EXACT")]
    Exact,
    #[serde(rename = "prefix", alias = "START", alias = "start")]
    Prefix,
    #[serde(rename = "suffix", alias = "END", alias = "end")]
    Suffix,
    #[serde(rename = "anywhere", alias = "ANYWHERE", alias = "contains")]
    Anywhere,
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Prefix => write!(f, "prefix"),
            Self::Suffix => write!(f, "suffix"),
            Self::Anywhere => write!(f, "anywhere"),
        }
    }
}

// ── Document (as written on disk) ───────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDocument {
    #[serde(alias = "immuta")]
    pub registry_a: Option<RegistryDocument>,
    pub provider: Option<ProviderDocument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RegistryDocument {
    pub url: String,
    #[serde(alias = "apikey", alias = "api_key")]
    pub api_key: Option<String>,
    #[serde(alias = "limit")]
    pub page_limit: i64,
    #[serde(alias = "throttle")]
    pub throttle_seconds: f64,
    pub tls_ca_path: Option<PathBuf>,
    pub tls_insecure: bool,
    /// Legacy `tls: { ca: ... }` block.
    pub tls: Option<LegacyTls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ProviderDocument {
    pub id: String,
    pub url: String,
    pub username: String,
    pub password: Option<String>,
    #[serde(alias = "asset_types", alias = "assetTypes")]
    pub asset_type_ids: Vec<String>,
    #[serde(alias = "limit")]
    pub page_limit: i64,
    #[serde(alias = "throttle")]
    pub throttle_seconds: f64,
    #[serde(alias = "match_mode")]
    pub match_mode: MatchMode,
    #[serde(alias = "match_prefix")]
    pub match_prefix: String,
    pub tls_ca_path: Option<PathBuf>,
    pub tls_insecure: bool,
    pub tls: Option<LegacyTls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LegacyTls {
    pub ca: Option<PathBuf>,
}

// ── Validation ──────────────────────────────────────────────────────

impl ConfigDocument {
    /// Validate the parsed document. `env` resolves secrets that were left
    /// empty in the file.
    pub(crate) fn validate(
        self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let registry = self.registry_a.ok_or_else(|| missing_section("registryA"))?;
        let provider = self.provider.ok_or_else(|| missing_section("provider"))?;

        Ok(Config {
            registry: registry.validate(&env)?,
            provider: provider.validate(&env)?,
        })
    }
}

impl RegistryDocument {
    fn validate(self, env: &impl Fn(&str) -> Option<String>) -> Result<RegistryConfig, ConfigError> {
        let url = validate_url("registryA", "registryA.url", &self.url)?;
        let api_key = resolve_secret(self.api_key, API_KEY_ENV, env).ok_or(ConfigError::Missing {
            section: "registryA",
            field: "apiKey",
        })?;

        Ok(RegistryConfig {
            url,
            api_key,
            paging: page_settings("registryA", self.page_limit, self.throttle_seconds)?,
            tls: TlsSettings {
                ca_path: self.tls_ca_path.or(self.tls.and_then(|t| t.ca)),
                insecure: self.tls_insecure,
            },
        })
    }
}

impl ProviderDocument {
    fn validate(self, env: &impl Fn(&str) -> Option<String>) -> Result<ProviderConfig, ConfigError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::Missing {
                section: "provider",
                field: "id",
            });
        }
        let url = validate_url("provider", "provider.url", &self.url)?;
        let username = self.username.trim().to_string();
        if username.is_empty() {
            return Err(ConfigError::Missing {
                section: "provider",
                field: "username",
            });
        }
        let password = resolve_secret(self.password, PASSWORD_ENV, env).ok_or(ConfigError::Missing {
            section: "provider",
            field: "password",
        })?;

        Ok(ProviderConfig {
            id,
            url,
            username,
            password,
            asset_type_ids: self.asset_type_ids,
            paging: page_settings("provider", self.page_limit, self.throttle_seconds)?,
            match_mode: self.match_mode,
            match_prefix: self.match_prefix,
            tls: TlsSettings {
                ca_path: self.tls_ca_path.or(self.tls.and_then(|t| t.ca)),
                insecure: self.tls_insecure,
            },
        })
    }
}

fn missing_section(section: &str) -> ConfigError {
    ConfigError::Invalid {
        field: section.to_string(),
        message: "section is missing".into(),
    }
}

fn validate_url(section: &'static str, field: &str, raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::Missing { section, field: "url" });
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            message: format!("{url:?} is not an http(s) URL"),
        });
    }
    Ok(url.to_string())
}

/// Value from the file if non-blank, else the environment variable.
fn resolve_secret(
    value: Option<String>,
    env_var: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| env(env_var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

/// Negative limits and throttles clamp to zero. A throttle that does not
/// fit in a `Duration` (too large, infinite, NaN) is rejected.
fn page_settings(
    section: &str,
    limit: i64,
    throttle_seconds: f64,
) -> Result<PageSettings, ConfigError> {
    if limit < 0 {
        tracing::warn!(section, limit, "negative pageLimit clamped to 0");
    }
    if throttle_seconds < 0.0 {
        tracing::warn!(section, throttle_seconds, "negative throttleSeconds clamped to 0");
    }

    let limit = limit.clamp(0, u32::MAX as i64) as u32;
    let throttle = if throttle_seconds < 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(throttle_seconds).map_err(|e| ConfigError::Invalid {
            field: format!("{section}.throttleSeconds"),
            message: format!("{throttle_seconds} is not a usable wait: {e}"),
        })?
    };

    Ok(PageSettings { limit, throttle })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn registry_doc() -> RegistryDocument {
        RegistryDocument {
            url: "https://tenant.immuta.test/".into(),
            api_key: Some("API_KEY".into()),
            ..Default::default()
        }
    }

    fn provider_doc() -> ProviderDocument {
        ProviderDocument {
            id: "collibra".into(),
            url: "https://catalog.collibra.test".into(),
            username: "svc".into(),
            password: Some("secret".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_registry_defaults() {
        let cfg = registry_doc().validate(&no_env).unwrap();
        assert_eq!(cfg.url, "https://tenant.immuta.test");
        assert_eq!(cfg.api_key, "API_KEY");
        assert_eq!(
            cfg.paging,
            PageSettings {
                limit: 0,
                throttle: Duration::ZERO,
            }
        );
        assert_eq!(cfg.tls, TlsSettings::default());
    }

    #[test]
    fn test_negative_paging_clamps_to_zero() {
        let settings = page_settings("provider", -5, -1.5).unwrap();
        assert_eq!(settings.limit, 0);
        assert_eq!(settings.throttle, Duration::ZERO);
    }

    #[test]
    fn test_oversized_throttle_is_invalid() {
        let err = page_settings("registryA", 10, 1e30).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref field, .. } if field == "registryA.throttleSeconds"),
            "{err}"
        );

        for bad in [f64::INFINITY, f64::NAN] {
            let err = page_settings("provider", 10, bad).unwrap_err();
            assert!(err.to_string().contains("provider.throttleSeconds"), "{err}");
        }
    }

    #[test]
    fn test_fractional_throttle() {
        let settings = page_settings("provider", 100, 0.25).unwrap();
        assert_eq!(settings.limit, 100);
        assert_eq!(settings.throttle, Duration::from_millis(250));
    }

    #[test]
    fn test_api_key_falls_back_to_env() {
        let mut doc = registry_doc();
        doc.api_key = Some("   ".into());
        let env = |name: &str| (name == API_KEY_ENV).then(|| "from-env".to_string());
        let cfg = doc.validate(&env).unwrap();
        assert_eq!(cfg.api_key, "from-env");
    }

    #[test]
    fn test_missing_api_key() {
        let mut doc = registry_doc();
        doc.api_key = None;
        let err = doc.validate(&no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "apiKey", .. }), "{err}");
    }

    #[test]
    fn test_provider_requires_id() {
        let mut doc = provider_doc();
        doc.id = "  ".into();
        let err = doc.validate(&no_env).unwrap_err();
        assert_eq!(err.to_string(), "missing required field 'provider.id'");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut doc = provider_doc();
        doc.url = "ftp://catalog".into();
        let err = doc.validate(&no_env).unwrap_err();
        assert!(err.to_string().contains("provider.url"), "{err}");
    }

    #[test]
    fn test_legacy_tls_block() {
        let mut doc = provider_doc();
        doc.tls = Some(LegacyTls {
            ca: Some(PathBuf::from("/etc/ca.pem")),
        });
        let cfg = doc.validate(&no_env).unwrap();
        assert_eq!(cfg.tls.ca_path, Some(PathBuf::from("/etc/ca.pem")));
        assert!(!cfg.tls.insecure);
    }

    #[test]
    fn test_match_mode_display() {
        assert_eq!(MatchMode::Exact.to_string(), "exact");
        assert_eq!(MatchMode::Suffix.to_string(), "suffix");
    }
}
