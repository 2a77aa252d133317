//! LLM provider domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use request::{FunctionCallMode, FunctionDefinition, LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, FunctionCall, LlmResponse, Usage};

#[cfg(test)]
pub use provider::MockLlmProvider;
#[cfg(test)]
pub use provider::mock::ScriptedLlmProvider;
