//! Local reverse-proxy validation adapter
//!
//! Emits no deployable configuration. The proxy's route table is owned by
//! deployment configuration; this adapter cross-checks it against the
//! routes extracted from the spec and writes a single plain-text
//! discrepancy report: routes in the spec but absent from the proxy, and
//! vice versa.

use crate::artifacts::{check_artifact, write_artifact, ArtifactFormat};
use crate::{ArtifactMap, GatewayAdapter, GenerationInput};
use gateway_config_gen_common::{GatewayError, HttpMethod, Result, ValidationReport};
use gateway_config_gen_spec::OpenApiSpec;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const PROVIDER: &str = "nginx";

const INSTRUCTIONS: &str = "\
The nginx adapter validates, it does not deploy. Review
validation-report.txt; every `missing from proxy` line is a spec route the
proxy will 404, every `unknown to spec` line is proxy surface no longer
described by the spec. Reconcile the route manifest in the deployment
repository, then reload the proxy with `nginx -s reload`.";

/// Externally maintained route manifest
///
/// ```yaml
/// routes:
///   - path: /reporting/health
///     methods: [GET]
/// ```
#[derive(Debug, Clone, Deserialize)]
struct RouteTable {
    #[serde(default)]
    routes: Vec<RouteTableEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RouteTableEntry {
    path: String,

    /// Methods the proxy accepts for this path; omitted means all five
    #[serde(default = "all_methods")]
    methods: Vec<HttpMethod>,
}

fn all_methods() -> Vec<HttpMethod> {
    HttpMethod::ORDERED.to_vec()
}

/// Local-proxy validator adapter
#[derive(Debug)]
pub struct NginxAdapter {
    input: GenerationInput,
}

impl NginxAdapter {
    pub fn new(input: GenerationInput) -> Self {
        Self { input }
    }

    fn load_route_table(&self) -> Result<RouteTable> {
        let path = self.input.options.route_table.as_ref().ok_or_else(|| {
            GatewayError::Generation {
                provider: PROVIDER.to_string(),
                message: "no proxy route table supplied; pass --route-table".to_string(),
            }
        })?;

        let content = fs::read_to_string(path).map_err(|e| GatewayError::Generation {
            provider: PROVIDER.to_string(),
            message: format!("failed to read route table {}: {}", path.display(), e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| GatewayError::Generation {
            provider: PROVIDER.to_string(),
            message: format!("route table {} is not valid YAML: {}", path.display(), e),
        })
    }

    /// Discrepancy lines, sorted; empty means the proxy matches the spec
    fn discrepancies(&self, table: &RouteTable) -> Vec<String> {
        let spec_routes: BTreeSet<(&str, HttpMethod)> = self
            .input
            .routes
            .iter()
            .map(|r| (r.path.as_str(), r.method))
            .collect();

        let proxy_routes: BTreeSet<(&str, HttpMethod)> = table
            .routes
            .iter()
            .flat_map(|entry| {
                entry
                    .methods
                    .iter()
                    .map(move |method| (entry.path.as_str(), *method))
            })
            .collect();

        let mut lines = Vec::new();
        for (path, method) in spec_routes.difference(&proxy_routes) {
            lines.push(format!("missing from proxy: {} {}", method, path));
        }
        for (path, method) in proxy_routes.difference(&spec_routes) {
            lines.push(format!("unknown to spec:    {} {}", method, path));
        }
        lines
    }
}

impl GatewayAdapter for NginxAdapter {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn deployment_instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn load_spec(&self) -> &OpenApiSpec {
        &self.input.spec
    }

    fn validate_spec(&self) -> ValidationReport {
        let mut report = gateway_config_gen_spec::validate(&self.input.spec);
        if self.input.options.route_table.is_none() {
            report.error("[nginx] no proxy route table supplied; pass --route-table");
        }
        report
    }

    fn generate_config(&self, output_dir: &Path) -> Result<ArtifactMap> {
        let table = self.load_route_table()?;
        let lines = self.discrepancies(&table);

        let mut content = String::from("proxy route validation report\n");
        content.push_str("=============================\n\n");
        if lines.is_empty() {
            content.push_str("no discrepancies: the proxy route table matches the spec\n");
        } else {
            for line in &lines {
                content.push_str(line);
                content.push('\n');
            }
            content.push_str(&format!("\n{} discrepancies found\n", lines.len()));
        }

        let path = write_artifact(PROVIDER, output_dir, "validation-report.txt", &content)?;

        let mut artifacts = ArtifactMap::new();
        artifacts.insert("validation-report".to_string(), path);
        Ok(artifacts)
    }

    fn validate_config(&self, artifacts: &ArtifactMap) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (name, path) in artifacts {
            check_artifact(PROVIDER, name, path, ArtifactFormat::Text, &mut report);
        }
        report
    }
}
