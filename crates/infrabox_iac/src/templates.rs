//! Terraform file templates and rendering.

use std::collections::HashMap;

use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{IacError, IacResult};
use crate::sanitize::{sanitize_dns_name, sanitize_input, sanitize_path};

/// Files generated for every environment, in write order.
pub const TEMPLATE_FILES: &[&str] = &["variables.tf", "main.tf", "outputs.tf"];

const TEMPLATES: &[(&str, &str)] = &[
    ("variables.tf", include_str!("../templates/variables.tf.tpl")),
    ("main.tf", include_str!("../templates/main.tf.tpl")),
    ("outputs.tf", include_str!("../templates/outputs.tf.tpl")),
];

/// Values frozen into an environment's generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub name_prefix: String,
    pub environment: String,
    pub location: String,
    pub dns_zone_name: String,
    pub admin_username: String,
    pub ssh_public_key_path: String,
}

impl TemplateContext {
    /// Default answers for every prompt of `initialize`.
    pub fn defaults_for(environment: &str) -> Self {
        Self {
            name_prefix: "Infrabox".to_string(),
            environment: environment.to_string(),
            location: "westeurope".to_string(),
            dns_zone_name: format!("Infrabox-{}.com", environment),
            admin_username: "azureuser".to_string(),
            ssh_public_key_path: "~/.ssh/id_rsa_infrabox.pub".to_string(),
        }
    }

    /// Re-sanitize every value with the sanitizer matching its kind.
    pub fn sanitized(&self) -> Self {
        Self {
            name_prefix: sanitize_input(&self.name_prefix),
            environment: sanitize_input(&self.environment),
            location: sanitize_input(&self.location),
            dns_zone_name: sanitize_dns_name(&self.dns_zone_name),
            admin_username: sanitize_input(&self.admin_username),
            ssh_public_key_path: sanitize_path(&self.ssh_public_key_path),
        }
    }

    pub fn to_variables(&self) -> HashMap<String, String> {
        HashMap::from([
            ("name_prefix".to_string(), self.name_prefix.clone()),
            ("environment".to_string(), self.environment.clone()),
            ("location".to_string(), self.location.clone()),
            ("dns_zone_name".to_string(), self.dns_zone_name.clone()),
            ("admin_username".to_string(), self.admin_username.clone()),
            ("ssh_public_key_path".to_string(), self.ssh_public_key_path.clone()),
        ])
    }
}

/// Renders the embedded Terraform templates.
pub struct TemplateRenderer {
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            // Match {{ variable_name }}; HCL's own ${...} interpolation is left alone
            variable_pattern: Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap(),
        }
    }

    /// Render the template registered under `template_name`.
    pub fn render(&self, template_name: &str, context: &TemplateContext) -> IacResult<String> {
        let template = TEMPLATES
            .iter()
            .find(|(name, _)| *name == template_name)
            .map(|(_, body)| *body)
            .ok_or_else(|| IacError::TemplateNotFound(template_name.to_string()))?;

        debug!("Rendering template {}", template_name);
        self.render_content(template, &context.to_variables())
    }

    /// Substitute `{{ name }}` placeholders; every placeholder must have a value.
    pub fn render_content(
        &self,
        content: &str,
        variables: &HashMap<String, String>,
    ) -> IacResult<String> {
        if let Some(missing) = self
            .variable_pattern
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .find(|name| !variables.contains_key(name))
        {
            return Err(IacError::MissingVariable(missing));
        }

        let rendered = self
            .variable_pattern
            .replace_all(content, |caps: &Captures| variables[&caps[1]].clone());

        Ok(rendered.into_owned())
    }
}
