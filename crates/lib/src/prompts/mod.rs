//! # Prompt Templates
//!
//! `PromptTemplate` holds a template string with `{variable}` placeholders and the
//! list of variables it declares. Rendering is strict: every declared variable must
//! be supplied. The submodules hold the default templates.

pub mod synthetic;
pub mod vector_sql;

use crate::errors::PromptError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A prompt with named `{variable}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Creates a template, detecting its input variables from the placeholders.
    pub fn new(template: impl Into<String>) -> Result<Self, PromptError> {
        let template = template.into();
        let mut input_variables: Vec<String> = Vec::new();
        for caps in PLACEHOLDER_REGEX.captures_iter(&template) {
            let name = caps[1].to_string();
            if !input_variables.contains(&name) {
                input_variables.push(name);
            }
        }
        Ok(Self {
            template,
            input_variables,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The variables in order of first appearance.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Fails unless every name in `required` is a placeholder of this template.
    pub fn require_variables(&self, required: &[&str]) -> Result<(), PromptError> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.input_variables.iter().any(|v| v == name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PromptError::InvalidConfiguration(format!(
                "prompt template is missing the variable(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Renders the template. Values that are not strings are rendered as JSON.
    /// Variables supplied but not declared are ignored.
    pub fn format(&self, variables: &Map<String, Value>) -> Result<String, PromptError> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|name| !variables.contains_key(name.as_str()))
        {
            return Err(PromptError::MissingPromptVariable(missing.clone()));
        }

        let rendered = PLACEHOLDER_REGEX.replace_all(&self.template, |caps: &regex::Captures| {
            variables
                .get(&caps[1])
                .map(render_value)
                .unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }
}

/// Renders a prompt variable: strings verbatim, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
