//! Google Cloud API Gateway adapter
//!
//! Emits the API config document (an OpenAPI 2.0 document, as the platform
//! requires, with one `x-google-backend` per operation), a values file for
//! the surrounding infrastructure, and a gcloud deploy script.

use crate::artifacts::{check_artifact, to_yaml_string, write_artifact, ArtifactFormat};
use crate::{
    operation_id, referenced_services, slugify, strictest_rate_limit, templates,
    untranslatable_scheme_warnings, ArtifactMap, GatewayAdapter, GenerationInput,
};
use gateway_config_gen_common::{Result, Route, ValidationReport};
use gateway_config_gen_spec::OpenApiSpec;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

const PROVIDER: &str = "gcp";

/// API Gateway rejects paths longer than this
const MAX_PATH_LENGTH: usize = 2048;

/// Quota metric name used when any route declares a rate limit
const QUOTA_METRIC: &str = "gateway-requests";

const INSTRUCTIONS: &str = "\
Run deploy.sh (requires an authenticated gcloud CLI); it uploads
api-config.yaml as an API Gateway api-config and creates a gateway for it.
Set PROJECT and REGION, or edit values.yaml and feed it to your own
tooling. The config embeds one x-google-backend per operation; regenerate
rather than editing it by hand.";

/// Google Cloud API Gateway adapter
#[derive(Debug)]
pub struct GcpAdapter {
    input: GenerationInput,
}

impl GcpAdapter {
    pub fn new(input: GenerationInput) -> Self {
        Self { input }
    }

    fn api_id(&self) -> String {
        let slug = slugify(self.input.spec.title());
        if slug.is_empty() {
            "gateway-api".to_string()
        } else {
            slug
        }
    }

    fn operation_node(&self, route: &Route) -> Value {
        let backend = self.input.backends.base_url_or_placeholder(&route.backend);

        let mut node = Map::new();
        node.insert("operationId".to_string(), json!(operation_id(route)));
        if !route.summary.is_empty() {
            node.insert("summary".to_string(), json!(route.summary));
        }
        node.insert(
            "responses".to_string(),
            json!({ "200": { "description": "proxied response" } }),
        );
        node.insert(
            "x-google-backend".to_string(),
            json!({
                "address": backend.trim_end_matches('/'),
                "path_translation": "APPEND_PATH_TO_ADDRESS"
            }),
        );

        if route.rate_limit().is_some() {
            let mut costs = Map::new();
            costs.insert(QUOTA_METRIC.to_string(), json!(1));
            node.insert(
                "x-google-quota".to_string(),
                json!({ "metricCosts": costs }),
            );
        }

        let security: Vec<Value> = route
            .security
            .iter()
            .filter(|name| self.translatable(name))
            .map(|name| json!({ name.clone(): [] }))
            .collect();
        if !security.is_empty() {
            node.insert("security".to_string(), json!(security));
        }

        Value::Object(node)
    }

    /// Whether a scheme lands in `securityDefinitions`; anything else is
    /// dropped from the operation so the config never references a
    /// definition that was not emitted
    fn translatable(&self, scheme_name: &str) -> bool {
        self.input
            .spec
            .security_scheme(scheme_name)
            .map(|s| s.is_api_key() || s.is_jwt())
            .unwrap_or(false)
    }

    fn security_definitions(&self) -> Value {
        let mut definitions = Map::new();
        let Some(components) = self.input.spec.components.as_ref() else {
            return Value::Object(definitions);
        };

        for (name, scheme) in &components.security_schemes {
            if scheme.is_api_key() {
                definitions.insert(
                    name.clone(),
                    json!({
                        "type": "apiKey",
                        "name": scheme.name.clone().unwrap_or_else(|| "key".to_string()),
                        "in": scheme.location.clone().unwrap_or_else(|| "query".to_string())
                    }),
                );
            } else if scheme.is_jwt() {
                definitions.insert(
                    name.clone(),
                    json!({
                        "type": "oauth2",
                        "flow": "implicit",
                        "authorizationUrl": "",
                        "x-google-issuer": scheme.issuer().unwrap_or("https://issuer.invalid"),
                        "x-google-jwks_uri": scheme
                            .jwks_uri()
                            .unwrap_or("https://issuer.invalid/.well-known/jwks.json")
                    }),
                );
            }
        }
        Value::Object(definitions)
    }

    /// The API config: OpenAPI 2.0 with Google backend extensions
    fn api_config(&self) -> Value {
        let mut paths: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
        for route in &self.input.routes {
            paths
                .entry(route.path.as_str())
                .or_default()
                .insert(route.method.key().to_string(), self.operation_node(route));
        }
        let paths_value: Map<String, Value> = paths
            .into_iter()
            .map(|(path, verbs)| (path.to_string(), Value::Object(verbs)))
            .collect();

        let mut config = Map::new();
        config.insert("swagger".to_string(), json!("2.0"));
        config.insert(
            "info".to_string(),
            json!({
                "title": self.input.spec.title(),
                "version": self.input.spec.version()
            }),
        );
        config.insert("schemes".to_string(), json!(["https"]));
        config.insert("produces".to_string(), json!(["application/json"]));
        config.insert("paths".to_string(), Value::Object(paths_value));

        let definitions = self.security_definitions();
        if definitions
            .as_object()
            .map(|m| !m.is_empty())
            .unwrap_or(false)
        {
            config.insert("securityDefinitions".to_string(), definitions);
        }

        if let Some(limit) = strictest_rate_limit(&self.input.routes) {
            // Quota units are per minute; scale the strictest declared
            // limit accordingly.
            let per_minute = (limit.requests * 60).div_ceil(limit.period_seconds.max(1));
            config.insert(
                "x-google-management".to_string(),
                json!({
                    "metrics": [{
                        "name": QUOTA_METRIC,
                        "displayName": "Gateway requests",
                        "valueType": "INT64",
                        "metricKind": "DELTA"
                    }],
                    "quota": {
                        "limits": [{
                            "name": "gateway-requests-per-minute",
                            "metric": QUOTA_METRIC,
                            "unit": "1/min/{project}",
                            "values": { "STANDARD": per_minute }
                        }]
                    }
                }),
            );
        }

        Value::Object(config)
    }

    fn values(&self) -> Value {
        let mut backends = Map::new();
        for service in referenced_services(&self.input) {
            backends.insert(
                service.name.clone(),
                json!({
                    "base_url": service.base_url,
                    "health_path": service.health_path
                }),
            );
        }

        json!({
            "project": "REPLACE_WITH_PROJECT_ID",
            "region": "us-central1",
            "api_id": self.api_id(),
            "backends": Value::Object(backends)
        })
    }
}

impl GatewayAdapter for GcpAdapter {
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

        for route in &self.input.routes {
            if route.path.len() > MAX_PATH_LENGTH {
                report.error(format!(
                    "[gcp] path {} exceeds {} characters",
                    route.path, MAX_PATH_LENGTH
                ));
            }
            if let Some(block) = route.rate_limit_block() {
                match route.rate_limit() {
                    Some(limit) if limit.requests == 0 => report.error(format!(
                        "[gcp] rate_limit.requests must be positive for {} {}",
                        route.method, route.path
                    )),
                    Some(_) => {}
                    None => report.error(format!(
                        "[gcp] malformed rate_limit block for {} {}: {}",
                        route.method, route.path, block
                    )),
                }
            }
        }

        for warning in untranslatable_scheme_warnings(&self.input, PROVIDER) {
            report.warning(warning);
        }
        report
    }

    fn generate_config(&self, output_dir: &Path) -> Result<ArtifactMap> {
        let tera = templates::load_templates(PROVIDER)?;

        let api_config = to_yaml_string(PROVIDER, &self.api_config())?;
        let values = to_yaml_string(PROVIDER, &self.values())?;

        let mut context = tera::Context::new();
        context.insert("api_id", &self.api_id());
        context.insert("services", &referenced_services(&self.input));
        let deploy = templates::render(&tera, PROVIDER, "gcp_deploy.sh", &context)?;

        let mut artifacts = ArtifactMap::new();
        artifacts.insert(
            "api-config".to_string(),
            write_artifact(PROVIDER, output_dir, "api-config.yaml", &api_config)?,
        );
        artifacts.insert(
            "values".to_string(),
            write_artifact(PROVIDER, output_dir, "values.yaml", &values)?,
        );
        artifacts.insert(
            "deploy-script".to_string(),
            write_artifact(PROVIDER, output_dir, "deploy.sh", &deploy)?,
        );
        Ok(artifacts)
    }

    fn validate_config(&self, artifacts: &ArtifactMap) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (name, path) in artifacts {
            let format = match name.as_str() {
                "api-config" | "values" => ArtifactFormat::Yaml,
                "deploy-script" => ArtifactFormat::Shell,
                _ => ArtifactFormat::Text,
            };
            check_artifact(PROVIDER, name, path, format, &mut report);
        }
        report
    }
}
