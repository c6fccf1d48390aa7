// `catalink run` and `catalink validate`

use std::io::{self, Write};
use std::path::PathBuf;

use catalink_client::{build_provider, ImmutaClient, Provider};
use catalink_config::{load, resolve_config_path, Config};
use catalink_linker::{connect, run, ManualReviewSink, RunOptions, RunReport};

use crate::CliError;

fn load_config(explicit: Option<PathBuf>) -> Result<(PathBuf, Config), CliError> {
    let path = resolve_config_path(explicit).map_err(CliError::config)?;
    let config = load(&path).map_err(CliError::config)?;
    Ok((path, config))
}

pub fn cmd_run(
    config: Option<PathBuf>,
    results_dir: PathBuf,
    dry_run: bool,
    json: bool,
) -> Result<(), CliError> {
    let (path, config) = load_config(config)?;
    tracing::info!(
        config = %path.display(),
        registry = %config.registry.url,
        provider = %config.provider.id,
        dry_run,
        "starting run"
    );

    let conns = connect(&config).map_err(CliError::linker)?;
    let mut sink = ManualReviewSink::new(results_dir);
    let report = run(
        &conns.registry,
        &conns.provider,
        &mut sink,
        RunOptions { dry_run },
    )
    .map_err(CliError::linker)?;

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| CliError::io(e.to_string()))?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", out).map_err(|e| CliError::io(e.to_string()))?;
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    let s = &report.summary;
    let verb = if s.dry_run { "would link" } else { "linked" };
    eprintln!(
        "{}: scanned {}, {} {}, deferred {}, unmatched {}, link failures {}",
        report.provider, s.scanned, verb, s.linked, s.deferred, s.unmatched, s.link_failures
    );
    if let Some(ref path) = report.review_artifact {
        eprintln!("review: {}", path.display());
    }
}

pub fn cmd_validate(config: Option<PathBuf>) -> Result<(), CliError> {
    let (path, config) = load_config(config)?;

    // Constructing the clients checks TLS material and the provider tag;
    // neither sends a request.
    ImmutaClient::new(&config.registry).map_err(CliError::client)?;
    let provider = build_provider(&config.provider).map_err(CliError::client)?;

    let registry = &config.registry;
    let p = &config.provider;
    println!("config ok: {}", path.display());
    println!(
        "  registryA: {} (pageLimit {}, throttle {:?})",
        registry.url, registry.paging.limit, registry.paging.throttle
    );
    println!(
        "  provider:  {} {} (match {}{}, pageLimit {}, assetTypes {})",
        provider.id(),
        p.url,
        p.match_mode,
        if p.match_prefix.is_empty() {
            String::new()
        } else {
            format!(", prefix {:?}", p.match_prefix)
        },
        p.paging.limit,
        p.asset_type_ids.len()
    );
    Ok(())
}
