//! Spec file loading
//!
//! Reads and parses the canonical OpenAPI document. A load failure is
//! fatal and aborts the run before any provider is touched.

use super::types::OpenApiSpec;
use gateway_config_gen_common::{GatewayError, Result};
use std::fs;
use std::path::Path;

/// Load an OpenAPI document from a YAML or JSON file
///
/// The format is chosen by extension; files with any other extension are
/// tried as JSON first, then YAML.
pub fn load_spec<P: AsRef<Path>>(path: P) -> Result<OpenApiSpec> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        GatewayError::SpecLoad(format!("failed to read {}: {}", path.display(), e))
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content, &path.display().to_string()),
        Some("yaml") | Some("yml") => from_yaml(&content, &path.display().to_string()),
        _ => parse_spec(&content)
            .map_err(|_| GatewayError::SpecLoad(format!(
                "{} is neither well-formed JSON nor well-formed YAML",
                path.display()
            ))),
    }
}

/// Parse an OpenAPI document from a string, trying JSON then YAML
pub fn parse_spec(content: &str) -> Result<OpenApiSpec> {
    from_json(content, "<inline>").or_else(|_| from_yaml(content, "<inline>"))
}

fn from_json(content: &str, source: &str) -> Result<OpenApiSpec> {
    serde_json::from_str(content).map_err(|e| {
        GatewayError::SpecLoad(format!("{} is not well-formed JSON: {}", source, e))
    })
}

fn from_yaml(content: &str, source: &str) -> Result<OpenApiSpec> {
    serde_yaml::from_str(content).map_err(|e| {
        GatewayError::SpecLoad(format!("{} is not well-formed YAML: {}", source, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_json() {
        let spec = parse_spec(
            r#"{
                "openapi": "3.0.3",
                "info": { "title": "Test API", "version": "1.0.0" },
                "paths": {}
            }"#,
        )
        .unwrap();

        assert_eq!(spec.openapi.as_deref(), Some("3.0.3"));
        assert_eq!(spec.title(), "Test API");
        assert!(spec.paths.unwrap().is_empty());
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let spec = parse_spec(
            "openapi: \"3.1.0\"\ninfo:\n  title: Test API\n  version: 1.0.0\npaths:\n  /reporting/health:\n    get:\n      summary: health probe\n",
        )
        .unwrap();

        let paths = spec.paths.unwrap();
        assert!(paths.contains_key("/reporting/health"));
        assert!(paths["/reporting/health"].get.is_some());
    }

    #[test]
    fn test_missing_top_level_keys_still_parse() {
        // Presence checks belong to the validator, not the parser.
        let spec = parse_spec(r#"{ "info": { "title": "t", "version": "1" } }"#).unwrap();
        assert!(spec.openapi.is_none());
        assert!(spec.paths.is_none());
    }

    #[test]
    fn test_garbage_is_a_load_error() {
        let err = parse_spec("openapi: [").unwrap_err();
        assert!(matches!(err, GatewayError::SpecLoad(_)));
    }

    #[test]
    fn test_missing_file_is_a_load_error() {
        let err = load_spec("/nonexistent/api.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/api.yaml"));
    }

    #[test]
    fn test_root_extensions_are_captured() {
        let spec = parse_spec(
            r#"{
                "openapi": "3.0.0",
                "info": { "title": "t", "version": "1" },
                "paths": {},
                "x-default-backend": "core"
            }"#,
        )
        .unwrap();
        assert_eq!(
            spec.extensions.get("x-default-backend").and_then(|v| v.as_str()),
            Some("core")
        );
    }
}
