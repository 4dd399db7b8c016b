//! Azure API Management adapter
//!
//! Emits an ARM template declaring the API and one operation resource per
//! route, an ARM deployment-parameters file, and an API-scope policy
//! fragment (CORS, rate limit, JWT validation, per-operation backend
//! overrides). Deployment goes through `az deployment group create`; no
//! companion script is emitted.

use crate::artifacts::{check_artifact, to_pretty_json, write_artifact, ArtifactFormat};
use crate::{
    operation_id, slugify, strictest_rate_limit, templates, untranslatable_scheme_warnings,
    ArtifactMap, GatewayAdapter, GenerationInput,
};
use gateway_config_gen_common::{Result, Route, ValidationReport};
use gateway_config_gen_spec::{OpenApiSpec, SecurityScheme};
use serde_json::{json, Value};
use std::path::Path;

const PROVIDER: &str = "azure";

/// API Management rejects operation urlTemplates longer than this
const MAX_URL_TEMPLATE: usize = 400;

const INSTRUCTIONS: &str = "\
Deploy template.json into the resource group that hosts your API
Management service:

  az deployment group create \\
    --resource-group <rg> \\
    --template-file template.json \\
    --parameters @parameters.json

Set `apimServiceName` in parameters.json first. Then attach policy.xml at
the API scope (Portal: API > Design > All operations > Inbound policy, or
`az apim api policy` where available).";

/// Azure API Management adapter
#[derive(Debug)]
pub struct AzureAdapter {
    input: GenerationInput,
}

impl AzureAdapter {
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

    /// API-level service URL: the default backend when configured,
    /// otherwise the first route's backend
    fn api_service_url(&self) -> String {
        if let Some(name) = self.input.backends.default_backend() {
            return self.input.backends.base_url_or_placeholder(name);
        }
        self.input
            .routes
            .first()
            .map(|r| self.input.backends.base_url_or_placeholder(&r.backend))
            .unwrap_or_else(|| "https://backend.invalid".to_string())
    }

    fn subscription_required(&self) -> bool {
        self.input.routes.iter().any(|route| {
            route.security.iter().any(|name| {
                self.input
                    .spec
                    .security_scheme(name)
                    .map(SecurityScheme::is_api_key)
                    .unwrap_or(false)
            })
        })
    }

    fn operation_resource(&self, route: &Route, api_id: &str) -> Value {
        let display_name = if route.summary.is_empty() {
            format!("{} {}", route.method, route.path)
        } else {
            route.summary.clone()
        };

        let template_parameters: Vec<Value> = route
            .path
            .split('/')
            .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
            .map(|name| json!({ "name": name, "type": "string", "required": true }))
            .collect();

        json!({
            "type": "Microsoft.ApiManagement/service/apis/operations",
            "apiVersion": "2022-08-01",
            "name": format!(
                "[concat(parameters('apimServiceName'), '/{}/{}')]",
                api_id,
                operation_id(route)
            ),
            "dependsOn": [format!(
                "[resourceId('Microsoft.ApiManagement/service/apis', parameters('apimServiceName'), '{}')]",
                api_id
            )],
            "properties": {
                "displayName": display_name,
                "method": route.method.as_str(),
                "urlTemplate": route.path,
                "templateParameters": template_parameters,
                "responses": []
            }
        })
    }

    fn template(&self) -> Value {
        let api_id = self.api_id();

        let mut resources = vec![json!({
            "type": "Microsoft.ApiManagement/service/apis",
            "apiVersion": "2022-08-01",
            "name": format!("[concat(parameters('apimServiceName'), '/{}')]", api_id),
            "properties": {
                "displayName": self.input.spec.title(),
                "apiRevision": "1",
                "path": "[parameters('apiPath')]",
                "protocols": ["https"],
                "serviceUrl": self.api_service_url(),
                "subscriptionRequired": self.subscription_required()
            }
        })];

        for route in &self.input.routes {
            resources.push(self.operation_resource(route, &api_id));
        }

        json!({
            "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#",
            "contentVersion": "1.0.0.0",
            "parameters": {
                "apimServiceName": {
                    "type": "string",
                    "metadata": { "description": "Name of the API Management service" }
                },
                "apiPath": {
                    "type": "string",
                    "defaultValue": api_id,
                    "metadata": { "description": "Public path prefix for the API" }
                }
            },
            "resources": resources
        })
    }

    fn parameters(&self) -> Value {
        json!({
            "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#",
            "contentVersion": "1.0.0.0",
            "parameters": {
                "apimServiceName": { "value": "REPLACE_WITH_APIM_SERVICE_NAME" },
                "apiPath": { "value": self.api_id() }
            }
        })
    }

    /// First JWT scheme any route requires, for the validate-jwt policy
    fn jwt_scheme(&self) -> Option<&SecurityScheme> {
        for route in &self.input.routes {
            for name in &route.security {
                if let Some(scheme) = self.input.spec.security_scheme(name) {
                    if scheme.is_jwt() {
                        return Some(scheme);
                    }
                }
            }
        }
        None
    }

    fn policy_context(&self) -> tera::Context {
        let mut context = tera::Context::new();

        let mut methods: Vec<&str> = self
            .input
            .routes
            .iter()
            .map(|r| r.method.as_str())
            .collect();
        methods.sort();
        methods.dedup();
        context.insert("methods", &methods);

        context.insert("rate_limit", &strictest_rate_limit(&self.input.routes));

        let jwt = self.jwt_scheme().map(|scheme| {
            let mut roles: Vec<String> = self
                .input
                .routes
                .iter()
                .flat_map(|r| r.roles())
                .collect();
            roles.sort();
            roles.dedup();
            json!({
                "openid_url": scheme
                    .open_id_connect_url
                    .as_deref()
                    .or(scheme.issuer())
                    .unwrap_or("https://login.example/.well-known/openid-configuration"),
                "roles": roles
            })
        });
        context.insert("jwt", &jwt);

        let api_url = self.api_service_url();
        let overrides: Vec<Value> = self
            .input
            .routes
            .iter()
            .filter_map(|route| {
                let base_url = self.input.backends.base_url_or_placeholder(&route.backend);
                if base_url == api_url {
                    None
                } else {
                    Some(json!({ "id": operation_id(route), "base_url": base_url }))
                }
            })
            .collect();
        context.insert("backend_overrides", &overrides);

        context
    }
}

impl GatewayAdapter for AzureAdapter {
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
            if route.path.len() > MAX_URL_TEMPLATE {
                report.error(format!(
                    "[azure] urlTemplate for {} {} exceeds {} characters",
                    route.method,
                    route.path,
                    MAX_URL_TEMPLATE
                ));
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
        let policy =
            templates::render(&tera, PROVIDER, "azure_policy.xml", &self.policy_context())?;

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
            "policy".to_string(),
            write_artifact(PROVIDER, output_dir, "policy.xml", &policy)?,
        );
        Ok(artifacts)
    }

    fn validate_config(&self, artifacts: &ArtifactMap) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (name, path) in artifacts {
            let format = match name.as_str() {
                "template" | "parameters" => ArtifactFormat::Json,
                "policy" => ArtifactFormat::Xml,
                _ => ArtifactFormat::Text,
            };
            check_artifact(PROVIDER, name, path, format, &mut report);
        }
        report
    }
}
