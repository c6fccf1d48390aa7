use catalink_client::{build_provider, ImmutaClient, Provider};
use catalink_config::Config;

use crate::error::LinkerError;

/// Both sides of a run, authenticated.
pub struct Connections {
    pub registry: ImmutaClient,
    pub provider: Box<dyn Provider>,
}

/// Build both clients, then authenticate registry first, provider second.
///
/// Everything that can fail without the network (unknown provider tag, bad
/// CA file) fails before the first request goes out.
pub fn connect(config: &Config) -> Result<Connections, LinkerError> {
    let mut registry = ImmutaClient::new(&config.registry)?;
    let mut provider = build_provider(&config.provider)?;

    registry.authenticate()?;
    provider.authenticate()?;

    tracing::debug!(provider = provider.id(), "connected");
    Ok(Connections { registry, provider })
}
