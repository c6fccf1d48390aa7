//! Registry and catalog API clients.
//!
//! Both sides are plain blocking HTTP+JSON clients sharing one transport
//! ([`http`]) and one offset pager ([`paging`]). No retries, no fan-out:
//! one request in flight at a time.

mod error;
mod http;
pub mod immuta;
pub mod model;
pub mod paging;
pub mod provider;

pub use error::ClientError;
pub use immuta::ImmutaClient;
pub use model::{CatalogRecord, ExternalResource, LinkOutcome};
pub use paging::{Page, PageRequest, Pager};
pub use provider::{build_provider, CollibraProvider, Provider, ProviderKind};
