//! Integration test for spec file loading

use gateway_config_gen_common::GatewayError;
use gateway_config_gen_spec::load_spec;
use std::fs;
use tempfile::TempDir;

const YAML: &str = "openapi: \"3.0.3\"\ninfo:\n  title: File API\n  version: \"1.0.0\"\npaths: {}\n";

const JSON: &str = r#"{
    "openapi": "3.0.3",
    "info": { "title": "File API", "version": "1.0.0" },
    "paths": {}
}"#;

#[test]
fn test_load_by_extension() {
    let dir = TempDir::new().unwrap();

    let yaml_path = dir.path().join("api.yaml");
    fs::write(&yaml_path, YAML).unwrap();
    let spec = load_spec(&yaml_path).unwrap();
    assert_eq!(spec.title(), "File API");

    let json_path = dir.path().join("api.json");
    fs::write(&json_path, JSON).unwrap();
    let spec = load_spec(&json_path).unwrap();
    assert_eq!(spec.openapi.as_deref(), Some("3.0.3"));
}

#[test]
fn test_unknown_extension_sniffs_both_formats() {
    let dir = TempDir::new().unwrap();

    let path = dir.path().join("api.spec");
    fs::write(&path, YAML).unwrap();
    assert!(load_spec(&path).is_ok());

    fs::write(&path, JSON).unwrap();
    assert!(load_spec(&path).is_ok());
}

#[test]
fn test_malformed_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("api.json");
    fs::write(&path, "{ broken").unwrap();

    let err = load_spec(&path).unwrap_err();
    assert!(matches!(err, GatewayError::SpecLoad(_)));
    assert!(err.to_string().contains("api.json"));
}
