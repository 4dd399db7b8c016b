//! Backend service resolution map
//!
//! Maps logical service names (e.g. "reporting") to connection descriptors.
//! The map is assembled from up to four sources, later ones winning:
//! the spec's `x-backend-services` / `x-default-backend` extensions, a YAML
//! override file, `GATEWAY_BACKEND_<NAME>` environment variables (base URL
//! only), and a default-backend name supplied by the driver. Read-only
//! during generation.

use crate::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Connection descriptor for one logical backend service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendService {
    /// Base URL, or a placeholder token substituted at deploy time
    pub base_url: String,

    /// Health-check path probed by deployment tooling
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

fn default_health_path() -> String {
    "/healthz".to_string()
}

/// On-disk layout of the `--backend-map` override file
#[derive(Debug, Clone, Default, Deserialize)]
struct BackendMapFile {
    #[serde(default)]
    default_backend: Option<String>,

    #[serde(default)]
    services: BTreeMap<String, BackendService>,
}

/// Logical service name -> connection descriptor table
#[derive(Debug, Clone, Default)]
pub struct BackendMap {
    services: BTreeMap<String, BackendService>,
    default_backend: Option<String>,
}

impl BackendMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from the spec's root extension blocks
    ///
    /// Reads `x-backend-services` (name -> descriptor) and
    /// `x-default-backend` (string). A malformed block is a validation
    /// error naming the extension field.
    pub fn from_spec_extensions(extensions: &BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let mut map = Self::new();

        if let Some(value) = extensions.get("x-backend-services") {
            map.services = serde_json::from_value(value.clone()).map_err(|e| {
                GatewayError::SpecValidation {
                    field: "x-backend-services".to_string(),
                    message: format!("malformed backend table: {}", e),
                }
            })?;
        }

        if let Some(value) = extensions.get("x-default-backend") {
            let name = value.as_str().ok_or_else(|| GatewayError::SpecValidation {
                field: "x-default-backend".to_string(),
                message: format!("expected a service name string, found {}", value),
            })?;
            map.default_backend = Some(name.to_string());
        }

        Ok(map)
    }

    /// Merge a YAML override file on top of the current map
    ///
    /// File entries win over spec-sourced entries.
    pub fn load_overrides(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            GatewayError::SpecLoad(format!(
                "failed to read backend map {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: BackendMapFile = serde_yaml::from_str(&content).map_err(|e| {
            GatewayError::SpecLoad(format!(
                "backend map {} is not valid YAML: {}",
                path.display(),
                e
            ))
        })?;

        for (name, service) in file.services {
            self.services.insert(name, service);
        }
        if file.default_backend.is_some() {
            self.default_backend = file.default_backend;
        }

        Ok(())
    }

    /// Apply `GATEWAY_BACKEND_<NAME>` environment overrides
    ///
    /// Each variable overrides (or introduces) the base URL of the service
    /// named by the lowercased suffix.
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(suffix) = key.strip_prefix("GATEWAY_BACKEND_") {
                if suffix.is_empty() || value.is_empty() {
                    continue;
                }
                let name = suffix.to_ascii_lowercase();
                self.services
                    .entry(name)
                    .and_modify(|s| s.base_url = value.clone())
                    .or_insert_with(|| BackendService {
                        base_url: value.clone(),
                        health_path: default_health_path(),
                    });
            }
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, service: BackendService) {
        self.services.insert(name.into(), service);
    }

    pub fn set_default_backend(&mut self, name: impl Into<String>) {
        self.default_backend = Some(name.into());
    }

    pub fn default_backend(&self) -> Option<&str> {
        self.default_backend.as_deref()
    }

    pub fn resolve(&self, name: &str) -> Option<&BackendService> {
        self.services.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered service names, sorted
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// (name, descriptor) pairs, sorted by name
    pub fn services(&self) -> impl Iterator<Item = (&str, &BackendService)> {
        self.services.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Base URL for a service, or a recognizable placeholder when the
    /// service is known only by name
    pub fn base_url_or_placeholder(&self, name: &str) -> String {
        self.resolve(name)
            .map(|s| s.base_url.clone())
            .unwrap_or_else(|| format!("https://{}.backend.invalid", name))
    }
}
