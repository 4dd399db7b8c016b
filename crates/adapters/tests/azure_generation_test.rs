//! Integration test for the Azure API Management adapter

use gateway_config_gen_adapters::{AdapterOptions, AdapterRegistry, GenerationInput};
use gateway_config_gen_common::BackendMap;
use gateway_config_gen_spec::{extract_routes, openapi::parse_spec};
use std::fs;
use tempfile::TempDir;

const SPEC: &str = r#"
openapi: "3.0.3"
info:
  title: Internal Services
  version: "1.0.0"
security:
  - bearer_auth: []
paths:
  /reporting/health:
    get:
      summary: Health probe
  /archive/exports/{id}:
    get:
      summary: Fetch an export
      x-gateway-config:
        backend: archive
        roles: [admin]
components:
  securitySchemes:
    bearer_auth:
      type: http
      scheme: bearer
      x-issuer: "https://login.example"
x-backend-services:
  reporting:
    base_url: "https://reporting.internal"
  archive:
    base_url: "https://archive.internal"
x-default-backend: reporting
"#;

fn input() -> GenerationInput {
    let spec = parse_spec(SPEC).unwrap();
    let backends = BackendMap::from_spec_extensions(&spec.extensions).unwrap();
    let routes = extract_routes(&spec, &backends).unwrap();
    GenerationInput {
        spec,
        routes,
        backends,
        options: AdapterOptions::default(),
    }
}

#[test]
fn test_generate_azure_artifacts() {
    let registry = AdapterRegistry::with_builtin();
    let adapter = registry.create("azure", input()).unwrap();

    assert!(!adapter.validate_spec().has_errors());

    let dir = TempDir::new().unwrap();
    let artifacts = adapter.generate_config(dir.path()).unwrap();

    // Template, parameters, policy fragment; deliberately no deploy script.
    assert_eq!(artifacts.len(), 3);
    assert!(!artifacts.contains_key("deploy-script"));

    let template: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&artifacts["template"]).unwrap()).unwrap();
    let resources = template["resources"].as_array().unwrap();

    // One API resource plus one operation resource per route.
    let operations: Vec<&serde_json::Value> = resources
        .iter()
        .filter(|r| r["type"] == "Microsoft.ApiManagement/service/apis/operations")
        .collect();
    assert_eq!(resources.len(), 3);
    assert_eq!(operations.len(), 2);

    // Path template parameters are declared on the operation.
    let export_op = operations
        .iter()
        .find(|op| op["properties"]["urlTemplate"] == "/archive/exports/{id}")
        .unwrap();
    assert_eq!(
        export_op["properties"]["templateParameters"][0]["name"],
        "id"
    );

    // The API defaults to the configured default backend.
    let api = resources
        .iter()
        .find(|r| r["type"] == "Microsoft.ApiManagement/service/apis")
        .unwrap();
    assert_eq!(api["properties"]["serviceUrl"], "https://reporting.internal");

    // Routes on a different backend get a set-backend-service override,
    // and the JWT policy carries the role claim.
    let policy = fs::read_to_string(&artifacts["policy"]).unwrap();
    assert!(policy.trim_start().starts_with('<'));
    assert!(policy.contains("validate-jwt"));
    assert!(policy.contains("https://archive.internal"));
    assert!(policy.contains("<value>admin</value>"));

    assert!(!adapter.validate_config(&artifacts).has_errors());
}

#[test]
fn test_oversized_url_template_is_rejected() {
    let long_path = format!("/reporting/{}", "a/".repeat(250));
    let spec = parse_spec(&format!(
        "openapi: \"3.0.0\"\ninfo:\n  title: t\n  version: \"1\"\npaths:\n  {}:\n    get: {{}}\nx-default-backend: reporting\n",
        long_path.trim_end_matches('/')
    ))
    .unwrap();
    let backends = BackendMap::from_spec_extensions(&spec.extensions).unwrap();
    let routes = extract_routes(&spec, &backends).unwrap();

    let registry = AdapterRegistry::with_builtin();
    let adapter = registry
        .create(
            "azure",
            GenerationInput {
                spec,
                routes,
                backends,
                options: AdapterOptions::default(),
            },
        )
        .unwrap();

    let report = adapter.validate_spec();
    assert!(report.has_errors());
    assert!(report
        .error_messages()
        .iter()
        .any(|m| m.contains("[azure]")));
}
