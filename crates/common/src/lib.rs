//! Common types and utilities for gateway-config-gen
//!
//! This crate contains the shared data structures, error taxonomy, and the
//! backend resolution map used across the spec, adapter, and CLI components.

mod backend_map;

pub use backend_map::{BackendMap, BackendService};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while compiling gateway configuration
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Spec load error: {0}")]
    SpecLoad(String),

    #[error("Spec validation error in `{field}`: {message}")]
    SpecValidation { field: String, message: String },

    #[error("Unknown provider `{requested}` (known providers: {})", .known.join(", "))]
    UnknownProvider {
        requested: String,
        known: Vec<String>,
    },

    #[error("[{provider}] generation failed: {message}")]
    Generation { provider: String, message: String },

    #[error("[{provider}] output validation failed for {}: {message}", .path.display())]
    OutputValidation {
        provider: String,
        path: PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GatewayError {
    /// One-line remediation hint surfaced next to the error message
    pub fn remediation(&self) -> &'static str {
        match self {
            GatewayError::SpecLoad(_) => {
                "check that the spec path exists and is well-formed YAML or JSON"
            }
            GatewayError::SpecValidation { .. } => {
                "fix the named field in the OpenAPI document and re-run"
            }
            GatewayError::UnknownProvider { .. } => "pass one of the listed providers, or `all`",
            GatewayError::Generation { .. } => {
                "treat the provider's output subdirectory as unusable; re-run with --verbose for detail"
            }
            GatewayError::OutputValidation { .. } => {
                "delete the provider's output subdirectory and regenerate"
            }
            GatewayError::Io(_) => "check filesystem permissions on the output directory",
            GatewayError::Json(_) | GatewayError::Yaml(_) => "check the input document syntax",
        }
    }
}

/// Result type for gateway compilation operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Target platform for generated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Nginx,
    Aws,
    Azure,
    Gcp,
}

impl Provider {
    /// All supported providers, in registry order
    pub const ALL: [Provider; 4] = [Provider::Nginx, Provider::Aws, Provider::Azure, Provider::Gcp];

    /// Stable identifier, also used as the output subdirectory name
    pub fn name(self) -> &'static str {
        match self {
            Provider::Nginx => "nginx",
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP methods supported for gateway routing
///
/// The derived `Ord` follows declaration order, which is also the fixed
/// verb ordering used wherever routes are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Fixed ordering: GET, POST, PUT, DELETE, PATCH
    pub const ORDERED: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Lowercase form used as an OpenAPI path-item key
    pub fn key(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized (path, method) pair extracted from the spec
///
/// Recomputed fresh on every run; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Path template, e.g. `/reporting/jobs/{id}`
    pub path: String,

    /// HTTP method
    pub method: HttpMethod,

    /// Operation summary (may be empty)
    #[serde(default)]
    pub summary: String,

    /// Security scheme names required by the operation (empty = public)
    #[serde(default)]
    pub security: Vec<String>,

    /// Resolved logical backend service name
    pub backend: String,

    /// Opaque `x-gateway-config` extension block, if any
    #[serde(default)]
    pub gateway_config: Option<serde_json::Value>,
}

/// Rate-limit settings carried in `x-gateway-config.rate_limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Allowed requests per period
    pub requests: u64,
    /// Period length in seconds
    pub period_seconds: u64,
}

impl Route {
    /// Raw `rate_limit` block, present or not, well-formed or not
    pub fn rate_limit_block(&self) -> Option<&serde_json::Value> {
        self.gateway_config.as_ref()?.get("rate_limit")
    }

    /// Parsed `rate_limit` block; `None` when absent or malformed
    pub fn rate_limit(&self) -> Option<RateLimit> {
        let block = self.rate_limit_block()?;
        Some(RateLimit {
            requests: block.get("requests")?.as_u64()?,
            period_seconds: block
                .get("period")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(60),
        })
    }

    /// Role names from `x-gateway-config.roles`
    pub fn roles(&self) -> Vec<String> {
        self.gateway_config
            .as_ref()
            .and_then(|c| c.get("roles"))
            .and_then(|r| r.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Severity of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One validation finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationEntry {
    pub severity: Severity,
    pub message: String,
}

/// Ordered list of validation findings
///
/// Produced by the spec validator and by each adapter's output validation;
/// immutable once handed to the driver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.entries.push(ValidationEntry {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.entries.push(ValidationEntry {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    /// Append all entries of `other`, preserving order
    pub fn merge(&mut self, other: ValidationReport) {
        self.entries.extend(other.entries);
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ValidationEntry] {
        &self.entries
    }

    /// Messages of all error-severity entries
    pub fn error_messages(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .map(|e| e.message.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_ordering_is_fixed() {
        let mut methods = vec![HttpMethod::Patch, HttpMethod::Get, HttpMethod::Delete];
        methods.sort();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Delete, HttpMethod::Patch]
        );
    }

    #[test]
    fn test_report_severity_gating() {
        let mut report = ValidationReport::new();
        assert!(!report.has_errors());

        report.warning("paths is empty");
        assert!(!report.has_errors());
        assert!(!report.is_empty());

        report.error("openapi field is missing");
        assert!(report.has_errors());
        assert_eq!(report.error_messages(), vec!["openapi field is missing"]);
    }

    #[test]
    fn test_route_rate_limit_parsing() {
        let route = Route {
            path: "/reporting/jobs".to_string(),
            method: HttpMethod::Post,
            summary: String::new(),
            security: vec![],
            backend: "reporting".to_string(),
            gateway_config: Some(json!({
                "rate_limit": { "requests": 100, "period": 30 },
                "roles": ["admin", "operator"]
            })),
        };

        let limit = route.rate_limit().unwrap();
        assert_eq!(limit.requests, 100);
        assert_eq!(limit.period_seconds, 30);
        assert_eq!(route.roles(), vec!["admin", "operator"]);
    }

    #[test]
    fn test_route_rate_limit_defaults_and_malformed() {
        let mut route = Route {
            path: "/x".to_string(),
            method: HttpMethod::Get,
            summary: String::new(),
            security: vec![],
            backend: "core".to_string(),
            gateway_config: Some(json!({ "rate_limit": { "requests": 10 } })),
        };
        assert_eq!(route.rate_limit().unwrap().period_seconds, 60);

        route.gateway_config = Some(json!({ "rate_limit": { "requests": "lots" } }));
        assert!(route.rate_limit().is_none());
        assert!(route.rate_limit_block().is_some());
    }

    #[test]
    fn test_unknown_provider_display_lists_known() {
        let err = GatewayError::UnknownProvider {
            requested: "openstack".to_string(),
            known: vec!["aws".to_string(), "nginx".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("openstack"));
        assert!(message.contains("aws, nginx"));
    }
}
