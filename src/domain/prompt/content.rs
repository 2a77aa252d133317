//! Message content assembly
//!
//! A message template holds either a literal string or an ordered list of
//! content blocks. Blocks can be switched off with `include = false`, which
//! lets callers keep optional prompt fragments inline and toggle them per run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::template;
use crate::domain::chain::LinkResults;
use crate::domain::llm::{Message, MessageRole};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A conditionally-included template fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub template: String,
    #[serde(default = "default_include")]
    pub include: bool,
}

fn default_include() -> bool {
    true
}

impl ContentBlock {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            include: true,
        }
    }

    pub fn when(template: impl Into<String>, include: bool) -> Self {
        Self {
            template: template.into(),
            include,
        }
    }
}

/// Content of a message template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<ContentBlock>> for MessageContent {
    fn from(value: Vec<ContentBlock>) -> Self {
        Self::Blocks(value)
    }
}

/// Formatting flags for block content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentOptions {
    /// Join blocks with `\n` instead of a single space
    pub join_with_newline: bool,
    /// Replace every whitespace run in the joined text with one space
    pub collapse_whitespace: bool,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            join_with_newline: true,
            collapse_whitespace: false,
        }
    }
}

/// Build the final text for one message
pub fn build_content(
    content: &MessageContent,
    results: Option<&LinkResults>,
    options: ContentOptions,
) -> String {
    let blocks = match content {
        MessageContent::Text(text) => return template::render(text, results),
        MessageContent::Blocks(blocks) => blocks,
    };

    let separator = if options.join_with_newline { "\n" } else { " " };

    let joined = blocks
        .iter()
        .filter(|block| block.include)
        .map(|block| template::render(&block.template, results))
        .collect::<Vec<_>>()
        .join(separator);

    if options.collapse_whitespace {
        WHITESPACE_RUN.replace_all(&joined, " ").into_owned()
    } else {
        joined
    }
}

/// A role-tagged message template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    #[serde(default)]
    pub role: MessageRole,
    pub content: MessageContent,
    #[serde(default = "default_join_with_newline")]
    pub join_with_newline: bool,
    #[serde(default)]
    pub collapse_whitespace: bool,
}

fn default_join_with_newline() -> bool {
    true
}

impl MessageTemplate {
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
            join_with_newline: true,
            collapse_whitespace: false,
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn with_join_with_newline(mut self, join_with_newline: bool) -> Self {
        self.join_with_newline = join_with_newline;
        self
    }

    pub fn with_collapse_whitespace(mut self, collapse_whitespace: bool) -> Self {
        self.collapse_whitespace = collapse_whitespace;
        self
    }

    pub fn options(&self) -> ContentOptions {
        ContentOptions {
            join_with_newline: self.join_with_newline,
            collapse_whitespace: self.collapse_whitespace,
        }
    }

    pub fn render(&self, results: Option<&LinkResults>) -> Message {
        Message::new(
            self.role,
            build_content(&self.content, results, self.options()),
        )
    }
}

/// Ordered list of message templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet {
    templates: Vec<MessageTemplate>,
}

impl TemplateSet {
    pub fn new(templates: Vec<MessageTemplate>) -> Self {
        Self { templates }
    }

    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn templates(&self) -> &[MessageTemplate] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render every template into a concrete message, in order
    pub fn render(&self, results: Option<&LinkResults>) -> Vec<Message> {
        self.templates
            .iter()
            .map(|template| template.render(results))
            .collect()
    }
}
