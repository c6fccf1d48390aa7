//! `catalink-linker`: catalog reconciliation engine.
//!
//! Walks the registry's unlinked records, searches the provider for each
//! name and applies the 0/1/many policy: no match is skipped, a single
//! match is linked, several matches are deferred to a manual-review
//! artifact. No CLI concerns.

pub mod connect;
pub mod engine;
pub mod error;
pub mod model;
pub mod review;

pub use connect::{connect, Connections};
pub use engine::{reconcile, run, RecordSource, RunOptions};
pub use error::LinkerError;
pub use model::{DeferredAmbiguity, LinkedPair, RunReport, RunSummary};
pub use review::{ManualReviewSink, ReviewDocument, ReviewSink};
