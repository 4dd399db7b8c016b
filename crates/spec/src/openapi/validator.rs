//! Structural spec validation
//!
//! Base rules every provider shares, evaluated before any generation
//! occurs. Adapters layer provider-specific rules on top of these.

use super::types::OpenApiSpec;
use gateway_config_gen_common::ValidationReport;
use regex::Regex;

/// Validate structural completeness and version compatibility
///
/// Pure function, no side effects. Rules run in order and the first
/// structural failure short-circuits, since later rules assume the earlier
/// ones held. Unsupported HTTP verbs are skipped silently; that is
/// intentional, not an oversight.
pub fn validate(spec: &OpenApiSpec) -> ValidationReport {
    let mut report = ValidationReport::new();

    match spec.openapi.as_deref() {
        None => {
            report.error("`openapi` field is missing; expected a version starting with \"3.\"");
            return report;
        }
        Some(version) if !version.starts_with("3.") => {
            report.error(format!(
                "incompatible OpenAPI version \"{}\"; this compiler requires \"3.*\"",
                version
            ));
            return report;
        }
        Some(_) => {}
    }

    if spec.info.is_none() {
        report.error("`info` object is missing");
        return report;
    }

    let Some(paths) = spec.paths.as_ref() else {
        report.error("`paths` object is missing (an empty `paths: {}` is valid)");
        return report;
    };

    if paths.is_empty() {
        // Legal, if degenerate.
        report.warning("`paths` is empty; nothing will be generated");
        return report;
    }

    let template = path_template_pattern();
    for path in paths.keys() {
        if !template.is_match(path) {
            report.error(format!(
                "malformed path template `{}`; expected /segments of literals or {{placeholders}}",
                path
            ));
        }
    }

    report
}

/// Pattern for a well-formed path template: leading `/`, each segment a
/// literal or a `{placeholder}`, optional trailing slash
fn path_template_pattern() -> Regex {
    Regex::new(r"^/$|^(/(?:[A-Za-z0-9_.~-]+|\{[A-Za-z_][A-Za-z0-9_]*\}))+/?$")
        .expect("path template pattern is valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::parse_spec;

    #[test]
    fn test_missing_openapi_field() {
        let spec = parse_spec(r#"{ "info": { "title": "t", "version": "1" }, "paths": {} }"#)
            .unwrap();
        let report = validate(&spec);
        assert!(report.has_errors());
        assert!(report.error_messages()[0].contains("openapi"));
    }

    #[test]
    fn test_version_gate_names_both_versions() {
        let spec = parse_spec(
            r#"{ "openapi": "2.0", "info": { "title": "t", "version": "1" }, "paths": {} }"#,
        )
        .unwrap();
        let report = validate(&spec);
        assert!(report.has_errors());
        let message = report.error_messages()[0];
        assert!(message.contains("2.0"));
        assert!(message.contains("3."));
    }

    #[test]
    fn test_missing_info() {
        let spec = parse_spec(r#"{ "openapi": "3.0.0", "paths": {} }"#).unwrap();
        let report = validate(&spec);
        assert!(report.has_errors());
        assert!(report.error_messages()[0].contains("info"));
    }

    #[test]
    fn test_missing_paths() {
        let spec =
            parse_spec(r#"{ "openapi": "3.0.0", "info": { "title": "t", "version": "1" } }"#)
                .unwrap();
        let report = validate(&spec);
        assert!(report.has_errors());
        assert!(report.error_messages()[0].contains("paths"));
    }

    #[test]
    fn test_empty_paths_is_legal() {
        let spec = parse_spec(
            r#"{ "openapi": "3.0.0", "info": { "title": "t", "version": "1" }, "paths": {} }"#,
        )
        .unwrap();
        let report = validate(&spec);
        assert!(!report.has_errors());
        assert!(!report.is_empty()); // degenerate-spec warning
    }

    #[test]
    fn test_valid_spec_is_clean() {
        let spec = parse_spec(
            r#"{
                "openapi": "3.0.3",
                "info": { "title": "t", "version": "1" },
                "paths": {
                    "/reporting/jobs/{id}": { "get": { "summary": "fetch" } },
                    "/": { "get": {} }
                }
            }"#,
        )
        .unwrap();
        let report = validate(&spec);
        assert!(report.is_empty(), "unexpected findings: {:?}", report);
    }

    #[test]
    fn test_malformed_path_template() {
        let spec = parse_spec(
            r#"{
                "openapi": "3.0.3",
                "info": { "title": "t", "version": "1" },
                "paths": { "/bad//{x": { "get": {} } }
            }"#,
        )
        .unwrap();
        let report = validate(&spec);
        assert!(report.has_errors());
        assert!(report.error_messages()[0].contains("/bad//{x"));
    }
}
