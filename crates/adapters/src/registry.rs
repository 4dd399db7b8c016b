//! Name-keyed adapter registry
//!
//! Built once at startup; resolves a requested provider string to its
//! adapter constructor.

use crate::aws::AwsAdapter;
use crate::azure::AzureAdapter;
use crate::gcp::GcpAdapter;
use crate::nginx::NginxAdapter;
use crate::{GatewayAdapter, GenerationInput};
use gateway_config_gen_common::{GatewayError, Result};
use std::collections::BTreeMap;

type AdapterFactory = fn(GenerationInput) -> Box<dyn GatewayAdapter>;

/// Maps a provider identifier to its adapter constructor
pub struct AdapterRegistry {
    factories: BTreeMap<&'static str, AdapterFactory>,
}

impl AdapterRegistry {
    /// Registry with all built-in providers
    pub fn with_builtin() -> Self {
        let mut factories: BTreeMap<&'static str, AdapterFactory> = BTreeMap::new();
        factories.insert("nginx", |input| Box::new(NginxAdapter::new(input)));
        factories.insert("aws", |input| Box::new(AwsAdapter::new(input)));
        factories.insert("azure", |input| Box::new(AzureAdapter::new(input)));
        factories.insert("gcp", |input| Box::new(GcpAdapter::new(input)));
        Self { factories }
    }

    /// Registered provider identifiers, sorted
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Instantiate the adapter registered under `name`
    pub fn create(&self, name: &str, input: GenerationInput) -> Result<Box<dyn GatewayAdapter>> {
        match self.factories.get(name) {
            Some(factory) => Ok(factory(input)),
            None => Err(GatewayError::UnknownProvider {
                requested: name.to_string(),
                known: self.provider_names().iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_provider_names_are_sorted() {
        let registry = AdapterRegistry::with_builtin();
        assert_eq!(registry.provider_names(), vec!["aws", "azure", "gcp", "nginx"]);
    }

    #[test]
    fn test_unknown_provider_lists_known() {
        let registry = AdapterRegistry::with_builtin();
        let input = GenerationInput {
            spec: gateway_config_gen_spec::openapi::parse_spec(
                r#"{ "openapi": "3.0.0", "info": { "title": "t", "version": "1" }, "paths": {} }"#,
            )
            .unwrap(),
            routes: vec![],
            backends: gateway_config_gen_common::BackendMap::new(),
            options: crate::AdapterOptions::default(),
        };

        let err = registry.create("openstack", input).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("openstack"));
        for name in ["aws", "azure", "gcp", "nginx"] {
            assert!(message.contains(name), "missing {} in: {}", name, message);
        }
    }
}
