//! Route extraction and backend resolution
//!
//! Produces the normalized route list shared by every adapter. Ordering is
//! enforced here, not in the adapters: paths iterate sorted and verbs
//! follow the fixed GET,POST,PUT,DELETE,PATCH order, so regenerated
//! artifacts are reproducible byte-for-byte.

use crate::openapi::{OpenApiSpec, Operation};
use gateway_config_gen_common::{BackendMap, GatewayError, Result, Route};

/// Outcome of the backend resolution chain for one route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResolution {
    /// `x-gateway-config.backend` on the operation
    Explicit(String),
    /// First path segment matched a known service
    PrefixMatch(String),
    /// Configured default backend
    Default(String),
    /// No match and no default configured
    Unresolved,
}

impl BackendResolution {
    pub fn into_name(self) -> Option<String> {
        match self {
            BackendResolution::Explicit(name)
            | BackendResolution::PrefixMatch(name)
            | BackendResolution::Default(name) => Some(name),
            BackendResolution::Unresolved => None,
        }
    }
}

/// Resolve the backend for one route; first match wins
///
/// Precedence: explicit extension override, then first-path-segment match
/// against the backend map, then the configured default. Kept as a single
/// pure function so all four adapters agree on the resolution order.
pub fn resolve_backend(
    path: &str,
    explicit: Option<&str>,
    backends: &BackendMap,
) -> BackendResolution {
    if let Some(name) = explicit {
        return BackendResolution::Explicit(name.to_string());
    }

    if let Some(segment) = path.split('/').find(|s| !s.is_empty()) {
        if backends.contains(segment) {
            return BackendResolution::PrefixMatch(segment.to_string());
        }
    }

    match backends.default_backend() {
        Some(name) => BackendResolution::Default(name.to_string()),
        None => BackendResolution::Unresolved,
    }
}

/// Extract the normalized route list from a validated spec
///
/// An unresolved backend is a validation error naming the path, never a
/// silent drop.
pub fn extract_routes(spec: &OpenApiSpec, backends: &BackendMap) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    let Some(paths) = spec.paths.as_ref() else {
        return Ok(routes);
    };

    for (path, item) in paths {
        for (method, operation) in item.operations() {
            let resolution = resolve_backend(path, operation.backend_override(), backends);
            let backend = resolution.into_name().ok_or_else(|| {
                GatewayError::SpecValidation {
                    field: format!("paths.{}", path),
                    message: format!(
                        "no backend resolves {} {}: no prefix match and no default backend configured",
                        method, path
                    ),
                }
            })?;

            routes.push(Route {
                path: path.clone(),
                method,
                summary: operation.summary.clone().unwrap_or_default(),
                security: security_scheme_names(spec, operation),
                backend,
                gateway_config: operation.gateway_config().cloned(),
            });
        }
    }

    Ok(routes)
}

/// Scheme names an operation requires, falling back to the document-level
/// default; sorted and deduplicated
fn security_scheme_names(spec: &OpenApiSpec, operation: &Operation) -> Vec<String> {
    let requirements = operation.security.as_deref().unwrap_or(&spec.security);
    let mut names: Vec<String> = requirements
        .iter()
        .flat_map(|requirement| requirement.keys().cloned())
        .collect();
    names.sort();
    names.dedup();
    names
}
