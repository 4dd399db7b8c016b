//! Provider adapters for gateway-config-gen
//!
//! One adapter per target platform, all behind the same contract:
//!
//! - `nginx`: local reverse-proxy validator (diff-only, no deployable
//!   artifacts)
//! - `aws`: Amazon API Gateway (CloudFormation template + parameters +
//!   deploy script)
//! - `azure`: Azure API Management (ARM template + parameters + policy
//!   fragment)
//! - `gcp`: Google Cloud API Gateway (API config + values + deploy script)
//!
//! Adapters are pure compilers: they transform the shared (spec, routes,
//! backend map) input into files under their own output subdirectory and
//! never talk to a network or a cloud API.

pub mod artifacts;
pub mod aws;
pub mod azure;
pub mod gcp;
pub mod nginx;
pub mod registry;
mod templates;

use gateway_config_gen_common::{BackendMap, Result, Route, ValidationReport};
use gateway_config_gen_spec::OpenApiSpec;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use registry::AdapterRegistry;

/// Logical artifact name -> emitted file path
pub type ArtifactMap = BTreeMap<String, PathBuf>;

/// Read-only input shared by every adapter
///
/// The driver builds this once per run; adapters receive their own copy
/// and treat every field as immutable.
#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub spec: OpenApiSpec,
    pub routes: Vec<Route>,
    pub backends: BackendMap,
    pub options: AdapterOptions,
}

/// Adapter knobs supplied by the driver
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// Externally maintained proxy route table (nginx validator only)
    pub route_table: Option<PathBuf>,
}

/// Common contract implemented by every target platform
pub trait GatewayAdapter: std::fmt::Debug {
    /// Stable provider identifier, also the output subdirectory name
    fn provider_name(&self) -> &'static str;

    /// Static human-readable deployment instructions; no spec dependency
    fn deployment_instructions(&self) -> &'static str;

    /// The OpenAPI document driving generation
    ///
    /// The driver parses the document once; adapters reuse it, which keeps
    /// repeated loads idempotent.
    fn load_spec(&self) -> &OpenApiSpec;

    /// Base structural rules plus provider-specific checks
    ///
    /// Must not mutate the spec or touch the filesystem. Provider-specific
    /// findings carry the provider name in the message.
    fn validate_spec(&self) -> ValidationReport;

    /// Transform the input into platform artifacts under `output_dir`
    ///
    /// Creates `output_dir` if absent and returns the artifact name ->
    /// path map.
    fn generate_config(&self, output_dir: &Path) -> Result<ArtifactMap>;

    /// Re-open each emitted artifact and check it is non-empty and
    /// minimally well-formed for its format
    fn validate_config(&self, artifacts: &ArtifactMap) -> ValidationReport;
}

/// Backend service entry handed to deploy-script templates
#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct ServiceContext {
    pub name: String,
    pub base_url: String,
    pub health_path: String,
}

/// Services referenced by at least one route, sorted by name
pub(crate) fn referenced_services(input: &GenerationInput) -> Vec<ServiceContext> {
    let mut names: Vec<&str> = input.routes.iter().map(|r| r.backend.as_str()).collect();
    names.sort();
    names.dedup();
    names
        .into_iter()
        .map(|name| ServiceContext {
            name: name.to_string(),
            base_url: input.backends.base_url_or_placeholder(name),
            health_path: input
                .backends
                .resolve(name)
                .map(|s| s.health_path.clone())
                .unwrap_or_else(|| "/healthz".to_string()),
        })
        .collect()
}

/// Strictest (lowest-rate) rate limit across all routes
///
/// Used by platforms whose throttling is gateway-wide rather than
/// per-operation.
pub(crate) fn strictest_rate_limit(routes: &[Route]) -> Option<gateway_config_gen_common::RateLimit> {
    routes
        .iter()
        .filter_map(Route::rate_limit)
        .min_by(|a, b| (a.requests * b.period_seconds).cmp(&(b.requests * a.period_seconds)))
}

/// Warnings for security schemes a route requires but the platform
/// translation cannot express
pub(crate) fn untranslatable_scheme_warnings(
    input: &GenerationInput,
    provider: &str,
) -> Vec<String> {
    let mut names: Vec<&str> = input
        .routes
        .iter()
        .flat_map(|r| r.security.iter().map(String::as_str))
        .collect();
    names.sort();
    names.dedup();

    let mut warnings = Vec::new();
    for name in names {
        match input.spec.security_scheme(name) {
            None => warnings.push(format!(
                "[{}] security scheme `{}` is referenced but not declared in components.securitySchemes",
                provider, name
            )),
            Some(scheme) if !scheme.is_api_key() && !scheme.is_jwt() => warnings.push(format!(
                "[{}] security scheme `{}` (type `{}`) has no native translation; routes using it are emitted without an auth annotation",
                provider, name, scheme.scheme_type
            )),
            Some(_) => {}
        }
    }
    warnings
}

/// Lowercase slug for identifiers derived from titles and paths
pub(crate) fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Deterministic operation identifier for one route, e.g.
/// `get-reporting-jobs-id`
pub(crate) fn operation_id(route: &Route) -> String {
    let path_slug = slugify(&route.path);
    if path_slug.is_empty() {
        format!("{}-root", route.method.key())
    } else {
        format!("{}-{}", route.method.key(), path_slug)
    }
}
