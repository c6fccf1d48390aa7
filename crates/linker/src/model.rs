use std::path::PathBuf;

use catalink_client::{CatalogRecord, ExternalResource};
use serde::{Deserialize, Serialize};

/// A record with more than one candidate, left for a human to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredAmbiguity {
    #[serde(rename = "datasource")]
    pub record: CatalogRecord,
    #[serde(rename = "resources")]
    pub matches: Vec<ExternalResource>,
}

/// A link written (or, in a dry run, planned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedPair {
    pub record_id: String,
    pub record_name: String,
    pub resource_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub linked: usize,
    pub deferred: usize,
    pub unmatched: usize,
    pub link_failures: usize,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub provider: String,
    pub run_at: String,
    pub summary: RunSummary,
    pub linked: Vec<LinkedPair>,
    pub deferred: Vec<DeferredAmbiguity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_artifact: Option<PathBuf>,
}

impl RunReport {
    pub(crate) fn new(provider: &str, dry_run: bool) -> Self {
        Self {
            provider: provider.to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            summary: RunSummary {
                dry_run,
                ..Default::default()
            },
            linked: Vec::new(),
            deferred: Vec::new(),
            review_artifact: None,
        }
    }
}
