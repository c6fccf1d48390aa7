use std::collections::HashSet;

use catalink_client::{
    CatalogRecord, ClientError, ExternalResource, ImmutaClient, LinkOutcome, Provider,
};

use crate::error::LinkerError;
use crate::model::{DeferredAmbiguity, LinkedPair, RunReport};
use crate::review::ReviewSink;

/// The registry side of a run: where unlinked records come from and where
/// links are written back.
pub trait RecordSource {
    /// Pages of records that carry no catalog link yet.
    fn unlinked(&self) -> Box<dyn Iterator<Item = Result<Vec<CatalogRecord>, ClientError>> + '_>;

    fn link(
        &self,
        provider_id: &str,
        record: &CatalogRecord,
        resource: &ExternalResource,
    ) -> Result<LinkOutcome, ClientError>;
}

impl RecordSource for ImmutaClient {
    fn unlinked(&self) -> Box<dyn Iterator<Item = Result<Vec<CatalogRecord>, ClientError>> + '_> {
        Box::new(self.search_unlinked())
    }

    fn link(
        &self,
        provider_id: &str,
        record: &CatalogRecord,
        resource: &ExternalResource,
    ) -> Result<LinkOutcome, ClientError> {
        ImmutaClient::link(self, provider_id, record, resource)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Search and classify, but never write links.
    pub dry_run: bool,
}

/// Single pass over every unlinked record.
///
/// A rejected link is logged and counted; the record stays unlinked and
/// the pass continues. Any other client error ends the pass.
pub fn reconcile<S, P>(source: &S, provider: &P, options: RunOptions) -> Result<RunReport, LinkerError>
where
    S: RecordSource + ?Sized,
    P: Provider + ?Sized,
{
    let provider_id = provider.id();
    let mut report = RunReport::new(provider_id, options.dry_run);
    let mut seen: HashSet<String> = HashSet::new();

    for page in source.unlinked() {
        for record in page? {
            // A record is resolved at most once per run, even if a shifting
            // listing hands it out twice.
            if !seen.insert(record.id.clone()) {
                tracing::debug!(record = %record.id, "already resolved this run, skipping");
                continue;
            }
            report.summary.scanned += 1;

            let mut matches = provider.search(&record.name)?;
            match matches.len() {
                0 => {
                    report.summary.unmatched += 1;
                    tracing::debug!(record = %record.id, name = %record.name, "no match");
                }
                1 => {
                    let resource = matches.remove(0);
                    link_one(source, provider_id, record, resource, options, &mut report)?;
                }
                n => {
                    tracing::info!(
                        record = %record.id,
                        name = %record.name,
                        candidates = n,
                        "multiple matches, deferred for manual review"
                    );
                    report.summary.deferred += 1;
                    report.deferred.push(DeferredAmbiguity { record, matches });
                }
            }
        }
    }

    tracing::info!(
        scanned = report.summary.scanned,
        linked = report.summary.linked,
        deferred = report.summary.deferred,
        unmatched = report.summary.unmatched,
        link_failures = report.summary.link_failures,
        dry_run = options.dry_run,
        "reconciliation finished"
    );
    Ok(report)
}

fn link_one<S: RecordSource + ?Sized>(
    source: &S,
    provider_id: &str,
    record: CatalogRecord,
    resource: ExternalResource,
    options: RunOptions,
    report: &mut RunReport,
) -> Result<(), LinkerError> {
    let pair = LinkedPair {
        record_id: record.id.clone(),
        record_name: record.name.clone(),
        resource_id: resource.id.clone(),
    };

    if options.dry_run {
        tracing::info!(record = %pair.record_id, resource = %pair.resource_id, "would link (dry run)");
        report.summary.linked += 1;
        report.linked.push(pair);
        return Ok(());
    }

    match source.link(provider_id, &record, &resource)? {
        LinkOutcome::Linked => {
            tracing::info!(
                record = %pair.record_id,
                name = %pair.record_name,
                resource = %pair.resource_id,
                provider = provider_id,
                "linked"
            );
            report.summary.linked += 1;
            report.linked.push(pair);
        }
        LinkOutcome::Rejected { status, message } => {
            tracing::warn!(
                record = %pair.record_id,
                resource = %pair.resource_id,
                status,
                %message,
                "link rejected, record left unlinked"
            );
            report.summary.link_failures += 1;
        }
    }
    Ok(())
}

/// Reconcile, then hand any deferred ambiguities to `sink`.
pub fn run<S, P, K>(
    source: &S,
    provider: &P,
    sink: &mut K,
    options: RunOptions,
) -> Result<RunReport, LinkerError>
where
    S: RecordSource + ?Sized,
    P: Provider + ?Sized,
    K: ReviewSink + ?Sized,
{
    let mut report = reconcile(source, provider, options)?;
    if !report.deferred.is_empty() {
        report.review_artifact = Some(sink.flush(&report.deferred)?);
    }
    Ok(report)
}
