//! Amazon API Gateway adapter
//!
//! Emits a CloudFormation template whose REST API body is the spec
//! re-expressed with one `x-amazon-apigateway-integration` per operation,
//! a CloudFormation parameters file, and a deploy script.

use crate::artifacts::{check_artifact, to_pretty_json, write_artifact, ArtifactFormat};
use crate::{
    operation_id, referenced_services, slugify, strictest_rate_limit, templates,
    untranslatable_scheme_warnings, ArtifactMap, GatewayAdapter, GenerationInput,
};
use gateway_config_gen_common::{RateLimit, Result, Route, ValidationReport};
use gateway_config_gen_spec::OpenApiSpec;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

const PROVIDER: &str = "aws";

/// Longest resource path part API Gateway accepts
const MAX_PATH_SEGMENT: usize = 64;

const INSTRUCTIONS: &str = "\
Run deploy.sh (requires an authenticated AWS CLI); it creates or updates a
CloudFormation stack from template.json with the values in parameters.json.
Override the stack name with STACK_NAME. The REST API body embeds one
HTTP_PROXY integration per route; backend URLs were substituted at
generation time, so regenerate rather than editing the template by hand.";

/// Amazon API Gateway adapter
#[derive(Debug)]
pub struct AwsAdapter {
    input: GenerationInput,
}

impl AwsAdapter {
    pub fn new(input: GenerationInput) -> Self {
        Self { input }
    }

    /// One OpenAPI operation node carrying the proxy integration
    fn operation_node(&self, route: &Route) -> Value {
        let backend = self.input.backends.base_url_or_placeholder(&route.backend);
        let uri = format!("{}{}", backend.trim_end_matches('/'), route.path);

        let mut node = Map::new();
        node.insert("operationId".to_string(), json!(operation_id(route)));
        if !route.summary.is_empty() {
            node.insert("summary".to_string(), json!(route.summary));
        }
        node.insert(
            "responses".to_string(),
            json!({ "default": { "description": "proxied response" } }),
        );
        node.insert(
            "x-amazon-apigateway-integration".to_string(),
            json!({
                "type": "http_proxy",
                "httpMethod": route.method.as_str(),
                "uri": uri,
                "passthroughBehavior": "when_no_match",
                "timeoutInMillis": 29000
            }),
        );

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

    fn translatable(&self, scheme_name: &str) -> bool {
        self.input
            .spec
            .security_scheme(scheme_name)
            .map(|s| s.is_api_key() || s.is_jwt())
            .unwrap_or(false)
    }

    /// The embedded REST API body: the spec's routes with integrations
    fn openapi_body(&self) -> Value {
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

        json!({
            "openapi": "3.0.1",
            "info": {
                "title": self.input.spec.title(),
                "version": self.input.spec.version()
            },
            "paths": paths_value,
            "components": { "securitySchemes": self.security_schemes_node() }
        })
    }

    fn security_schemes_node(&self) -> Value {
        let mut schemes = Map::new();
        let Some(components) = self.input.spec.components.as_ref() else {
            return Value::Object(schemes);
        };

        for (name, scheme) in &components.security_schemes {
            if scheme.is_api_key() {
                schemes.insert(
                    name.clone(),
                    json!({
                        "type": "apiKey",
                        "name": scheme.name.clone().unwrap_or_else(|| "x-api-key".to_string()),
                        "in": scheme.location.clone().unwrap_or_else(|| "header".to_string())
                    }),
                );
            } else if scheme.is_jwt() {
                schemes.insert(
                    name.clone(),
                    json!({
                        "type": "oauth2",
                        "flows": {},
                        "x-amazon-apigateway-authorizer": {
                            "type": "jwt",
                            "jwtConfiguration": {
                                "issuer": scheme.issuer().unwrap_or("https://issuer.invalid")
                            },
                            "identitySource": "$request.header.Authorization"
                        }
                    }),
                );
            }
        }
        Value::Object(schemes)
    }

    /// Strictest rate limit across all routes, applied as a stage-wide
    /// usage plan
    fn throttle(&self) -> Option<RateLimit> {
        strictest_rate_limit(&self.input.routes)
    }

    fn template(&self) -> Value {
        let mut resources = Map::new();
        resources.insert(
            "RestApi".to_string(),
            json!({
                "Type": "AWS::ApiGateway::RestApi",
                "Properties": {
                    "Name": { "Ref": "ApiName" },
                    "Body": self.openapi_body(),
                    "EndpointConfiguration": { "Types": ["REGIONAL"] }
                }
            }),
        );
        resources.insert(
            "Deployment".to_string(),
            json!({
                "Type": "AWS::ApiGateway::Deployment",
                "Properties": { "RestApiId": { "Ref": "RestApi" } }
            }),
        );
        resources.insert(
            "Stage".to_string(),
            json!({
                "Type": "AWS::ApiGateway::Stage",
                "Properties": {
                    "RestApiId": { "Ref": "RestApi" },
                    "DeploymentId": { "Ref": "Deployment" },
                    "StageName": { "Ref": "StageName" }
                }
            }),
        );

        if let Some(limit) = self.throttle() {
            let rate = limit.requests as f64 / limit.period_seconds as f64;
            resources.insert(
                "UsagePlan".to_string(),
                json!({
                    "Type": "AWS::ApiGateway::UsagePlan",
                    "Properties": {
                        "ApiStages": [{ "ApiId": { "Ref": "RestApi" }, "Stage": { "Ref": "Stage" } }],
                        "Throttle": { "RateLimit": rate, "BurstLimit": limit.requests }
                    }
                }),
            );
        }

        json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Description": format!("API gateway for {}", self.input.spec.title()),
            "Parameters": {
                "ApiName": { "Type": "String", "Default": self.input.spec.title() },
                "StageName": { "Type": "String", "Default": "prod" }
            },
            "Resources": Value::Object(resources),
            "Outputs": {
                "RestApiId": { "Value": { "Ref": "RestApi" } }
            }
        })
    }

    fn parameters(&self) -> Value {
        json!([
            { "ParameterKey": "ApiName", "ParameterValue": self.input.spec.title() },
            { "ParameterKey": "StageName", "ParameterValue": "prod" }
        ])
    }
}

impl GatewayAdapter for AwsAdapter {
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
            for segment in route.path.split('/') {
                if segment.len() > MAX_PATH_SEGMENT {
                    report.error(format!(
                        "[aws] path segment `{}` in {} exceeds {} characters",
                        segment, route.path, MAX_PATH_SEGMENT
                    ));
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

        let template = to_pretty_json(PROVIDER, &self.template())?;
        let parameters = to_pretty_json(PROVIDER, &self.parameters())?;

        let mut context = tera::Context::new();
        let stack_name = slugify(self.input.spec.title());
        context.insert(
            "stack_name",
            if stack_name.is_empty() { "api-gateway" } else { stack_name.as_str() },
        );
        context.insert("services", &referenced_services(&self.input));
        let deploy = templates::render(&tera, PROVIDER, "aws_deploy.sh", &context)?;

        let mut artifacts = ArtifactMap::new();
        artifacts.insert(
            "template".to_string(),
            write_artifact(PROVIDER, output_dir, "template.json", &template)?,
        );
        artifacts.insert(
            "parameters".to_string(),
            write_artifact(PROVIDER, output_dir, "parameters.json", &parameters)?,
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
                "template" | "parameters" => ArtifactFormat::Json,
                "deploy-script" => ArtifactFormat::Shell,
                _ => ArtifactFormat::Text,
            };
            check_artifact(PROVIDER, name, path, format, &mut report);
        }
        report
    }
}
