//! Chain entity and link types

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::ChainError;
use super::function::FunctionLink;
use crate::domain::llm::{FunctionCallMode, FunctionDefinition, Message};
use crate::domain::prompt::TemplateSet;

/// Default number of attempts for a model link
pub const DEFAULT_RETRIES: u32 = 3;

/// A model link: one completion call configured by templates or messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelLink {
    name: String,
    model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    messages: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    templates: Option<TemplateSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<FunctionDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCallMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retries: Option<u32>,
}

impl ModelLink {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            messages: None,
            templates: None,
            functions: None,
            function_call: None,
            retries: None,
        }
    }

    // Getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn top_p(&self) -> Option<f32> {
        self.top_p
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub fn messages(&self) -> Option<&[Message]> {
        self.messages.as_deref()
    }

    pub fn templates(&self) -> Option<&TemplateSet> {
        self.templates.as_ref()
    }

    pub fn functions(&self) -> Option<&[FunctionDefinition]> {
        self.functions.as_deref()
    }

    pub fn function_call(&self) -> Option<&FunctionCallMode> {
        self.function_call.as_ref()
    }

    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    /// Attempts this link gets: its own override, else the chain default,
    /// else [`DEFAULT_RETRIES`]. Never less than one.
    pub fn effective_retries(&self, chain_default: Option<u32>) -> u32 {
        self.retries
            .or(chain_default)
            .unwrap_or(DEFAULT_RETRIES)
            .max(1)
    }

    // Builder methods

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn with_templates(mut self, templates: TemplateSet) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn with_function_call(mut self, mode: FunctionCallMode) -> Self {
        self.function_call = Some(mode);
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// One step of a chain
#[derive(Debug, Clone)]
pub enum Link {
    Function(FunctionLink),
    Model(ModelLink),
}

impl Link {
    pub fn name(&self) -> &str {
        match self {
            Self::Function(link) => link.name(),
            Self::Model(link) => link.name(),
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }
}

impl From<FunctionLink> for Link {
    fn from(link: FunctionLink) -> Self {
        Self::Function(link)
    }
}

impl From<ModelLink> for Link {
    fn from(link: ModelLink) -> Self {
        Self::Model(link)
    }
}

/// An ordered, validated list of links
#[derive(Debug, Clone)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    /// Build a chain, rejecting empty chains and duplicate link names
    pub fn new(links: Vec<Link>) -> Result<Self, ChainError> {
        if links.is_empty() {
            return Err(ChainError::EmptyChain);
        }

        let mut seen = HashSet::new();

        for link in &links {
            if !seen.insert(link.name()) {
                return Err(ChainError::duplicate_link(link.name()));
            }
        }

        Ok(Self { links })
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn model_link_count(&self) -> usize {
        self.links.iter().filter(|link| link.is_model()).count()
    }
}
