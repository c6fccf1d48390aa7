//! Catalog providers: the external catalogs searched for a record's match.
//!
//! A provider is selected by the `provider.id` tag in the config. Adding a
//! catalog means a new [`ProviderKind`] variant, its tag, and an arm in
//! [`build_provider`].

mod collibra;

use std::str::FromStr;

use catalink_config::{ConfigError, ProviderConfig};

use crate::error::ClientError;
use crate::model::ExternalResource;

pub use collibra::CollibraProvider;

/// Capability every catalog provider offers.
pub trait Provider {
    /// Tag recorded as the `provider` of every link this provider produces.
    fn id(&self) -> &str;

    fn authenticate(&mut self) -> Result<(), ClientError>;

    /// All resources matching `name`, across every page, in server order.
    fn search(&self, name: &str) -> Result<Vec<ExternalResource>, ClientError>;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn authenticate(&mut self) -> Result<(), ClientError> {
        (**self).authenticate()
    }

    fn search(&self, name: &str) -> Result<Vec<ExternalResource>, ClientError> {
        (**self).search(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Collibra,
}

impl ProviderKind {
    pub const ALL: &'static [ProviderKind] = &[ProviderKind::Collibra];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Collibra => "collibra",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownProvider(s.to_string()))
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Construct the provider named by `config.id`. No network calls.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn Provider>, ClientError> {
    let kind: ProviderKind = config.id.parse()?;
    let provider: Box<dyn Provider> = match kind {
        ProviderKind::Collibra => Box::new(CollibraProvider::new(config)?),
    };
    tracing::debug!(provider = %kind, "provider built");
    Ok(provider)
}
