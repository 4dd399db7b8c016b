//! Integration test for the local-proxy validation adapter

use gateway_config_gen_adapters::{AdapterOptions, AdapterRegistry, GenerationInput};
use gateway_config_gen_common::BackendMap;
use gateway_config_gen_spec::{extract_routes, openapi::parse_spec};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SPEC: &str = r#"
openapi: "3.0.3"
info:
  title: Internal Services
  version: "1.0.0"
paths:
  /reporting/health:
    get:
      summary: Health probe
  /reporting/jobs:
    post:
      summary: Submit a job
x-backend-services:
  reporting:
    base_url: "https://reporting.internal"
"#;

fn input(route_table: Option<PathBuf>) -> GenerationInput {
    let spec = parse_spec(SPEC).unwrap();
    let backends = BackendMap::from_spec_extensions(&spec.extensions).unwrap();
    let routes = extract_routes(&spec, &backends).unwrap();
    GenerationInput {
        spec,
        routes,
        backends,
        options: AdapterOptions { route_table },
    }
}

fn write_table(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("proxy-routes.yaml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_matching_table_reports_no_discrepancies() {
    let dir = TempDir::new().unwrap();
    let table = write_table(
        &dir,
        "routes:\n  - path: /reporting/health\n    methods: [GET]\n  - path: /reporting/jobs\n    methods: [POST]\n",
    );

    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create("nginx", input(Some(table))).unwrap();
    assert!(!adapter.validate_spec().has_errors());

    let artifacts = adapter.generate_config(&dir.path().join("out")).unwrap();
    let report = fs::read_to_string(&artifacts["validation-report"]).unwrap();
    assert!(report.contains("no discrepancies"));
    assert!(!report.contains("missing from proxy"));

    assert!(!adapter.validate_config(&artifacts).has_errors());
}

#[test]
fn test_drift_is_reported_both_ways() {
    let dir = TempDir::new().unwrap();
    // The proxy knows /reporting/health but not /reporting/jobs, and it
    // still carries a retired /legacy/export route.
    let table = write_table(
        &dir,
        "routes:\n  - path: /reporting/health\n    methods: [GET]\n  - path: /legacy/export\n    methods: [GET]\n",
    );

    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create("nginx", input(Some(table))).unwrap();

    let artifacts = adapter.generate_config(&dir.path().join("out")).unwrap();
    let report = fs::read_to_string(&artifacts["validation-report"]).unwrap();
    assert!(report.contains("missing from proxy: POST /reporting/jobs"));
    assert!(report.contains("unknown to spec:    GET /legacy/export"));
    assert!(report.contains("2 discrepancies found"));
}

#[test]
fn test_omitted_methods_cover_all_verbs() {
    let dir = TempDir::new().unwrap();
    let table = write_table(&dir, "routes:\n  - path: /reporting/health\n");

    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create("nginx", input(Some(table))).unwrap();

    let artifacts = adapter.generate_config(&dir.path().join("out")).unwrap();
    let report = fs::read_to_string(&artifacts["validation-report"]).unwrap();
    // GET /reporting/health is covered; the other four verbs the proxy
    // accepts for that path count as unknown to the spec.
    assert!(!report.contains("missing from proxy: GET /reporting/health"));
    assert!(report.contains("unknown to spec:    POST /reporting/health"));
}

#[test]
fn test_missing_route_table_fails_validation_and_generation() {
    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create("nginx", input(None)).unwrap();

    let report = adapter.validate_spec();
    assert!(report.has_errors());
    assert!(report.error_messages()[0].contains("--route-table"));

    let dir = TempDir::new().unwrap();
    let err = adapter.generate_config(dir.path()).unwrap_err();
    assert!(err.to_string().contains("route table"));
}
