//! Template loading and management
//!
//! The script and policy artifacts are rendered through tera; JSON and
//! YAML artifacts are serialized directly and do not go through here.

use gateway_config_gen_common::{GatewayError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load the script and policy templates
pub fn load_templates(provider: &str) -> Result<Tera> {
    let mut tera = Tera::default();

    // Register custom filters
    tera.register_filter("shell_var", shell_var_filter);

    tera.add_raw_template("aws_deploy.sh", include_str!("../templates/aws_deploy.sh.tera"))
        .map_err(|e| template_error(provider, "aws_deploy.sh", &e))?;

    tera.add_raw_template("gcp_deploy.sh", include_str!("../templates/gcp_deploy.sh.tera"))
        .map_err(|e| template_error(provider, "gcp_deploy.sh", &e))?;

    tera.add_raw_template(
        "azure_policy.xml",
        include_str!("../templates/azure_policy.xml.tera"),
    )
    .map_err(|e| template_error(provider, "azure_policy.xml", &e))?;

    Ok(tera)
}

/// Render one template, mapping failures to a provider-scoped error
pub fn render(
    tera: &Tera,
    provider: &str,
    template: &str,
    context: &tera::Context,
) -> Result<String> {
    tera.render(template, context).map_err(|e| GatewayError::Generation {
        provider: provider.to_string(),
        message: format!("template {} failed to render: {}", template, e),
    })
}

fn template_error(provider: &str, name: &str, e: &tera::Error) -> GatewayError {
    GatewayError::Generation {
        provider: provider.to_string(),
        message: format!("failed to load {} template: {}", name, e),
    }
}

/// Filter to turn a service name into a shell variable stem
/// (e.g. `reporting-v2` -> `REPORTING_V2`)
fn shell_var_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("shell_var filter expects a string"))?;

    let var: String = s
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    Ok(Value::String(var))
}
