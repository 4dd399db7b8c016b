//! OpenAPI 3.x type definitions
//!
//! Simplified representation focusing on route extraction. Top-level keys
//! are optional so that a missing `openapi`/`info`/`paths` surfaces as a
//! validation error rather than a parse failure. All maps are BTreeMaps to
//! keep iteration order deterministic across runs.

use gateway_config_gen_common::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One security requirement: scheme name -> required scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// OpenAPI document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI version (e.g., "3.0.3")
    #[serde(default)]
    pub openapi: Option<String>,

    /// API metadata
    #[serde(default)]
    pub info: Option<Info>,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: Option<BTreeMap<String, PathItem>>,

    /// Document-level security requirements (default for all operations)
    #[serde(default)]
    pub security: Vec<SecurityRequirement>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,

    /// Servers
    #[serde(default)]
    pub servers: Vec<Server>,

    /// Root vendor extensions (`x-backend-services`, `x-default-backend`)
    /// and any top-level keys this compiler does not model
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl OpenApiSpec {
    /// API title, or a stable fallback
    pub fn title(&self) -> &str {
        self.info
            .as_ref()
            .map(|i| i.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("gateway")
    }

    /// API version string, or a stable fallback
    pub fn version(&self) -> &str {
        self.info
            .as_ref()
            .map(|i| i.version.as_str())
            .filter(|v| !v.is_empty())
            .unwrap_or("0.0.0")
    }

    /// Security scheme declaration by name
    pub fn security_scheme(&self, name: &str) -> Option<&SecurityScheme> {
        self.components.as_ref()?.security_schemes.get(name)
    }
}

/// API information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Path item (operations for a path)
///
/// Only the five supported verbs are modeled; any other verb key lands in
/// `other` and is skipped without error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    /// Unsupported verbs and path-level fields, retained but not routed
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl PathItem {
    /// Operations present on this path item, in the fixed verb order
    pub fn operations(&self) -> Vec<(HttpMethod, &Operation)> {
        let slots = [
            (HttpMethod::Get, self.get.as_ref()),
            (HttpMethod::Post, self.post.as_ref()),
            (HttpMethod::Put, self.put.as_ref()),
            (HttpMethod::Delete, self.delete.as_ref()),
            (HttpMethod::Patch, self.patch.as_ref()),
        ];
        slots
            .into_iter()
            .filter_map(|(method, op)| op.map(|op| (method, op)))
            .collect()
    }
}

/// HTTP operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Operation-level security; `None` falls back to the document default
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Vendor extensions (`x-gateway-config`) and unmodeled operation keys
    /// (parameters, responses, request bodies)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Operation {
    /// The `x-gateway-config` extension block, if present
    pub fn gateway_config(&self) -> Option<&Value> {
        self.extensions.get("x-gateway-config")
    }

    /// Explicit backend override from `x-gateway-config.backend`
    pub fn backend_override(&self) -> Option<&str> {
        self.gateway_config()?.get("backend")?.as_str()
    }
}

/// Reusable components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: BTreeMap<String, SecurityScheme>,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Security scheme declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// One of `apiKey`, `http`, `oauth2`, `openIdConnect`
    #[serde(rename = "type", default)]
    pub scheme_type: String,

    /// HTTP auth scheme (e.g. `bearer`) when `type: http`
    #[serde(default)]
    pub scheme: Option<String>,

    /// Header/query parameter name when `type: apiKey`
    #[serde(default)]
    pub name: Option<String>,

    /// Location (`header`, `query`, `cookie`) when `type: apiKey`
    #[serde(rename = "in", default)]
    pub location: Option<String>,

    #[serde(rename = "openIdConnectUrl", default)]
    pub open_id_connect_url: Option<String>,

    /// Scheme-level vendor extensions (issuer/jwks hints) and unmodeled
    /// keys such as oauth2 flows
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl SecurityScheme {
    /// Whether the scheme translates to JWT validation on the gateway
    pub fn is_jwt(&self) -> bool {
        match self.scheme_type.as_str() {
            "oauth2" | "openIdConnect" => true,
            "http" => self.scheme.as_deref() == Some("bearer"),
            _ => false,
        }
    }

    pub fn is_api_key(&self) -> bool {
        self.scheme_type == "apiKey"
    }

    /// Token issuer hint: `x-issuer` extension, falling back to the OIDC
    /// discovery URL
    pub fn issuer(&self) -> Option<&str> {
        self.extensions
            .get("x-issuer")
            .and_then(Value::as_str)
            .or(self.open_id_connect_url.as_deref())
    }

    /// JWKS endpoint hint from the `x-jwks-uri` extension
    pub fn jwks_uri(&self) -> Option<&str> {
        self.extensions.get("x-jwks-uri").and_then(Value::as_str)
    }
}
