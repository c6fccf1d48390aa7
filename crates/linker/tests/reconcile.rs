// End-to-end reconciliation against mocked Immuta and Collibra servers.
// Run with: cargo test -p catalink-linker --test reconcile

use std::time::Duration;

use catalink_client::ClientError;
use catalink_config::{
    Config, MatchMode, PageSettings, ProviderConfig, RegistryConfig, TlsSettings,
};
use catalink_linker::{connect, run, LinkerError, ManualReviewSink, ReviewDocument, RunOptions};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn config(immuta: &MockServer, collibra: &MockServer) -> Config {
    Config {
        registry: RegistryConfig {
            url: immuta.base_url(),
            api_key: "API_KEY".into(),
            paging: PageSettings {
                limit: 0,
                throttle: Duration::ZERO,
            },
            tls: TlsSettings::default(),
        },
        provider: ProviderConfig {
            id: "collibra".into(),
            url: collibra.base_url(),
            username: "svc".into(),
            password: "secret".into(),
            asset_type_ids: vec!["TYPE_TABLE".into()],
            paging: PageSettings {
                limit: 0,
                throttle: Duration::ZERO,
            },
            match_mode: MatchMode::Exact,
            match_prefix: String::new(),
            tls: TlsSettings::default(),
        },
    }
}

fn mock_immuta_auth(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/bim/apikey/authenticate");
        then.status(200).json_body(json!({ "token": "TOKEN" }));
    });
}

fn mock_collibra_auth(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST).path("/rest/2.0/auth/sessions");
        then.status(200)
            .header("set-cookie", "JSESSIONID=s1; Path=/")
            .json_body(json!({}));
    });
}

fn mock_listing(server: &MockServer, hits: serde_json::Value) {
    let count = hits.as_array().map_or(0, |h| h.len());
    server.mock(|when, then| {
        when.method(GET).path("/dataSource");
        then.status(200).json_body(json!({ "count": count, "hits": hits }));
    });
}

fn mock_assets(server: &MockServer, name: &str, ids: &[&str]) {
    let results: Vec<_> = ids.iter().map(|id| json!({ "id": id, "name": name })).collect();
    let name = name.to_string();
    server.mock(move |when, then| {
        when.method(GET).path("/rest/2.0/assets").query_param("name", &name);
        then.status(200)
            .json_body(json!({ "total": results.len(), "results": results }));
    });
}

#[test]
fn links_single_match_and_defers_ambiguous() {
    let immuta = MockServer::start();
    let collibra = MockServer::start();
    mock_immuta_auth(&immuta);
    mock_collibra_auth(&collibra);
    mock_listing(
        &immuta,
        json!([
            { "id": "A1", "name": "orders" },
            { "id": "A2", "name": "users" },
            { "id": "A9", "name": "old", "catalogMetadata": { "id": "B0", "provider": "collibra" } }
        ]),
    );
    mock_assets(&collibra, "orders", &["B1"]);
    mock_assets(&collibra, "users", &["B2", "B3"]);

    let link = immuta.mock(|when, then| {
        when.method(PUT)
            .path("/dataSource/A1")
            .header("authorization", "TOKEN")
            .json_body(json!({ "catalogMetadata": { "id": "B1", "provider": "collibra" } }));
        then.status(200);
    });
    let other_links = immuta.mock(|when, then| {
        when.method(PUT).path("/dataSource/A2");
        then.status(200);
    });

    let tmp = TempDir::new().unwrap();
    let conns = connect(&config(&immuta, &collibra)).unwrap();
    let mut sink = ManualReviewSink::with_fallback(tmp.path(), Vec::new());
    let report = run(&conns.registry, &conns.provider, &mut sink, RunOptions::default()).unwrap();

    link.assert_calls(1);
    other_links.assert_calls(0);

    assert_eq!(report.provider, "collibra");
    assert_eq!(report.summary.scanned, 2);
    assert_eq!(report.summary.linked, 1);
    assert_eq!(report.summary.deferred, 1);

    let artifact = report.review_artifact.expect("artifact written");
    let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("results-") && name.ends_with(".json"), "{name}");

    let doc: ReviewDocument =
        serde_json::from_str(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(doc.deferred.len(), 1);
    assert_eq!(doc.deferred[0].record.id, "A2");
    let ids: Vec<&str> = doc.deferred[0].matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["B2", "B3"]);
}

#[test]
fn provider_auth_failure_stops_before_search() {
    let immuta = MockServer::start();
    let collibra = MockServer::start();
    mock_immuta_auth(&immuta);
    collibra.mock(|when, then| {
        when.method(POST).path("/rest/2.0/auth/sessions");
        then.status(401).json_body(json!({ "errorMessage": "Invalid credentials" }));
    });
    let listing = immuta.mock(|when, then| {
        when.method(GET).path("/dataSource");
        then.status(200).json_body(json!({ "count": 0, "hits": [] }));
    });
    let assets = collibra.mock(|when, then| {
        when.method(GET).path("/rest/2.0/assets");
        then.status(200).json_body(json!({ "total": 0, "results": [] }));
    });

    let err = connect(&config(&immuta, &collibra)).err().expect("auth must fail");
    assert!(
        matches!(err, LinkerError::Client(ClientError::Auth { status: 401, .. })),
        "{err}"
    );
    listing.assert_calls(0);
    assets.assert_calls(0);
}

#[test]
fn no_match_is_skipped_without_artifact() {
    let immuta = MockServer::start();
    let collibra = MockServer::start();
    mock_immuta_auth(&immuta);
    mock_collibra_auth(&collibra);
    mock_listing(&immuta, json!([{ "id": "A3", "name": "ghosts" }]));
    mock_assets(&collibra, "ghosts", &[]);
    let puts = immuta.mock(|when, then| {
        when.method(PUT);
        then.status(200);
    });

    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    let conns = connect(&config(&immuta, &collibra)).unwrap();
    let mut sink = ManualReviewSink::with_fallback(&results, Vec::new());
    let report = run(&conns.registry, &conns.provider, &mut sink, RunOptions::default()).unwrap();

    puts.assert_calls(0);
    assert_eq!(report.summary.unmatched, 1);
    assert!(report.review_artifact.is_none());
    assert!(!results.exists());
}

#[test]
fn dry_run_writes_no_links() {
    let immuta = MockServer::start();
    let collibra = MockServer::start();
    mock_immuta_auth(&immuta);
    mock_collibra_auth(&collibra);
    mock_listing(&immuta, json!([{ "id": 1, "name": "orders" }]));
    mock_assets(&collibra, "orders", &["B1"]);
    let puts = immuta.mock(|when, then| {
        when.method(PUT);
        then.status(200);
    });

    let tmp = TempDir::new().unwrap();
    let conns = connect(&config(&immuta, &collibra)).unwrap();
    let mut sink = ManualReviewSink::with_fallback(tmp.path(), Vec::new());
    let report = run(&conns.registry, &conns.provider, &mut sink, RunOptions { dry_run: true }).unwrap();

    puts.assert_calls(0);
    assert_eq!(report.summary.linked, 1);
    assert_eq!(report.linked[0].record_id, "1");
    assert_eq!(report.linked[0].resource_id, "B1");
}

#[test]
fn unknown_provider_fails_before_any_request() {
    let immuta = MockServer::start();
    let collibra = MockServer::start();
    let auth = immuta.mock(|when, then| {
        when.method(POST).path("/bim/apikey/authenticate");
        then.status(200).json_body(json!({ "token": "TOKEN" }));
    });

    let mut cfg = config(&immuta, &collibra);
    cfg.provider.id = "alation".into();
    let err = connect(&cfg).err().expect("unknown provider");
    assert_eq!(err.to_string(), "unrecognized provider 'alation'");
    auth.assert_calls(0);
}
