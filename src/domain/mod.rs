//! Domain layer - chain orchestration, prompt templating and the LLM boundary

pub mod chain;
pub mod error;
pub mod llm;
pub mod prompt;

pub use chain::{
    Chain, ChainConfig, ChainError, ChainReport, ChainRunner, FunctionArgs, FunctionLink, Link,
    LinkResults, ModelLink, PathLookup,
};
pub use error::{DomainError, ProviderErrorDetail};
pub use llm::{
    FinishReason, FunctionCall, FunctionCallMode, FunctionDefinition, LlmProvider, LlmRequest,
    LlmResponse, Message, MessageRole, Usage,
};
pub use prompt::{ContentBlock, MessageContent, MessageTemplate, TemplateSet};
