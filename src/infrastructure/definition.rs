//! Chain definition files
//!
//! A definition describes the model links of a chain in TOML or JSON:
//!
//! ```toml
//! retries = 2
//!
//! [[links]]
//! name = "person"
//! model = "gpt-4o-mini"
//! function_call = "set_person"
//!
//! [[links.templates]]
//! role = "user"
//! content = "Extract the person from: {{text}}"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::chain::{ChainConfig, Link, ModelLink};
use crate::domain::{DomainError, FunctionCallMode, FunctionDefinition, Message, TemplateSet};

/// Parsed chain definition
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainDefinition {
    /// Chain-wide attempt budget for model links
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub links: Vec<LinkDefinition>,
}

/// One model link as written in a definition file
#[derive(Debug, Clone, Deserialize)]
pub struct LinkDefinition {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
    #[serde(default)]
    pub templates: Option<TemplateSet>,
    #[serde(default)]
    pub functions: Option<Vec<FunctionDefinition>>,
    /// `auto`, `none` or the name of the function to force
    #[serde(default)]
    pub function_call: Option<String>,
    #[serde(default)]
    pub retries: Option<u32>,
}

impl LinkDefinition {
    pub fn into_model_link(self) -> ModelLink {
        let mut link = ModelLink::new(self.name, self.model);

        if let Some(temperature) = self.temperature {
            link = link.with_temperature(temperature);
        }
        if let Some(top_p) = self.top_p {
            link = link.with_top_p(top_p);
        }
        if let Some(max_tokens) = self.max_tokens {
            link = link.with_max_tokens(max_tokens);
        }
        if let Some(messages) = self.messages {
            link = link.with_messages(messages);
        }
        if let Some(templates) = self.templates {
            link = link.with_templates(templates);
        }
        if let Some(functions) = self.functions {
            link = link.with_functions(functions);
        }
        if let Some(mode) = self.function_call {
            link = link.with_function_call(FunctionCallMode::parse(&mode));
        }
        if let Some(retries) = self.retries {
            link = link.with_retries(retries);
        }

        link
    }
}

impl ChainDefinition {
    /// Load a definition, choosing the format by file extension. Anything
    /// other than `.json` is read as TOML.
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read chain definition {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let definition = if is_json {
            Self::from_json_str(&source)?
        } else {
            Self::from_toml_str(&source)?
        };

        debug!(
            path = %path.display(),
            links = definition.links.len(),
            "Loaded chain definition"
        );

        Ok(definition)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, DomainError> {
        toml::from_str(source).map_err(|e| {
            DomainError::configuration(format!("Invalid TOML chain definition: {}", e))
        })
    }

    pub fn from_json_str(source: &str) -> Result<Self, DomainError> {
        serde_json::from_str(source).map_err(|e| {
            DomainError::configuration(format!("Invalid JSON chain definition: {}", e))
        })
    }

    pub fn config(&self) -> ChainConfig {
        ChainConfig {
            retries: self.retries,
        }
    }

    /// Split into the chain settings and the model links, in file order
    pub fn into_parts(self) -> (ChainConfig, Vec<Link>) {
        let config = self.config();
        let links = self
            .links
            .into_iter()
            .map(|link| Link::from(link.into_model_link()))
            .collect();

        (config, links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContentBlock, MessageContent, MessageRole};
    use serde_json::json;

    const PERSON_TOML: &str = r#"
retries = 2

[[links]]
name = "person"
model = "gpt-4o-mini"
temperature = 0.0
function_call = "set_person"

[[links.templates]]
role = "user"
content = "Extract the person from: {{text}}"

[[links.functions]]
name = "set_person"
description = "Record a person"
parameters = { type = "object", properties = { name = { type = "string" } } }

[[links]]
name = "greeting"
model = "gpt-4o-mini"
retries = 5

[[links.templates]]
role = "system"
collapse_whitespace = true
content = [
    { template = "Greet {{person.name}}." },
    { template = "Be formal.", include = false },
]
"#;

    #[test]
    fn test_parse_toml_definition() {
        let definition = ChainDefinition::from_toml_str(PERSON_TOML).unwrap();

        assert_eq!(definition.retries, Some(2));
        assert_eq!(definition.links.len(), 2);

        let (config, links) = definition.into_parts();
        assert_eq!(config.retries, Some(2));
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].name(), "person");
        assert_eq!(links[1].name(), "greeting");
        assert!(links.iter().all(Link::is_model));
    }

    #[test]
    fn test_function_call_short_forms() {
        let definition = ChainDefinition::from_toml_str(PERSON_TOML).unwrap();
        let person = definition.links[0].clone().into_model_link();

        assert_eq!(
            person.function_call(),
            Some(&FunctionCallMode::forced("set_person"))
        );
        assert_eq!(person.functions().map(<[_]>::len), Some(1));
        assert_eq!(person.temperature(), Some(0.0));

        let auto: LinkDefinition = serde_json::from_value(json!({
            "name": "a",
            "model": "m",
            "function_call": "auto"
        }))
        .unwrap();
        assert_eq!(
            auto.into_model_link().function_call(),
            Some(&FunctionCallMode::auto())
        );
    }

    #[test]
    fn test_block_templates_and_link_retries() {
        let definition = ChainDefinition::from_toml_str(PERSON_TOML).unwrap();
        let greeting = definition.links[1].clone().into_model_link();

        assert_eq!(greeting.retries(), Some(5));
        assert_eq!(greeting.effective_retries(definition.retries), 5);

        let templates = greeting.templates().unwrap().templates();
        assert_eq!(templates[0].role, MessageRole::System);
        assert!(templates[0].collapse_whitespace);
        assert_eq!(
            templates[0].content,
            MessageContent::Blocks(vec![
                ContentBlock::new("Greet {{person.name}}."),
                ContentBlock::when("Be formal.", false),
            ])
        );
    }

    #[test]
    fn test_parse_json_definition() {
        let definition = ChainDefinition::from_json_str(
            r#"{
                "links": [{
                    "name": "echo",
                    "model": "gpt-4o",
                    "messages": [{ "role": "user", "content": "Say hi" }]
                }]
            }"#,
        )
        .unwrap();

        assert!(definition.retries.is_none());

        let link = definition.links[0].clone().into_model_link();
        assert_eq!(link.messages().unwrap(), &[Message::user("Say hi")]);
    }

    #[test]
    fn test_invalid_definition_is_configuration_error() {
        let err = ChainDefinition::from_toml_str("[[links]]\nname = \"x\"").unwrap_err();

        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("Invalid TOML chain definition"));
    }

    #[test]
    fn test_bundled_nickname_chain_parses() {
        let definition =
            ChainDefinition::from_toml_str(include_str!("../../chains/nickname.toml")).unwrap();
        let (config, links) = definition.into_parts();

        assert_eq!(config.retries, Some(3));
        let names: Vec<&str> = links.iter().map(Link::name).collect();
        assert_eq!(names, vec!["name", "person"]);
    }

    #[test]
    fn test_load_picks_format_by_extension() {
        let dir = std::env::temp_dir().join(format!("chain-def-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("chain.toml");
        std::fs::write(&toml_path, PERSON_TOML).unwrap();
        let json_path = dir.join("chain.JSON");
        std::fs::write(&json_path, r#"{ "retries": 1, "links": [] }"#).unwrap();

        assert_eq!(ChainDefinition::load(&toml_path).unwrap().links.len(), 2);
        assert_eq!(ChainDefinition::load(&json_path).unwrap().retries, Some(1));

        let missing = ChainDefinition::load(&dir.join("missing.toml")).unwrap_err();
        assert!(matches!(missing, DomainError::Configuration { .. }));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
