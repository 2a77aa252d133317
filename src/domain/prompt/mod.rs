//! Prompt templating: link references and message content assembly

mod content;
pub mod template;

pub use content::{
    build_content, ContentBlock, ContentOptions, MessageContent, MessageTemplate, TemplateSet,
};
