//! Model invoker - one model link, bounded retry, result extraction

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::entity::ModelLink;
use super::error::ChainError;
use super::results::LinkResults;
use crate::domain::llm::{LlmProvider, LlmRequest, LlmResponse, Message};
use crate::domain::DomainError;

/// Outcome of a successful model call
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInvocation {
    /// Raw provider response of the successful attempt
    pub response: LlmResponse,
    /// Messages sent on the successful attempt
    pub sent_messages: Vec<Message>,
    /// Parsed function-call arguments, or the text content
    pub result: Value,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Invokes model links against a provider
#[derive(Debug, Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn LlmProvider>,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Run a model link with up to `retries` attempts.
    ///
    /// Templates are rendered again on every attempt from `results`.
    pub async fn invoke(
        &self,
        link: &ModelLink,
        results: &LinkResults,
        retries: u32,
    ) -> Result<ModelInvocation, ChainError> {
        if !has_prompt(link) {
            return Err(ChainError::configuration(
                link.name(),
                "Model link needs either messages or templates",
            ));
        }

        let retries = retries.max(1);
        let mut last_error = None;

        for attempt in 1..=retries {
            let messages = render_messages(link, results);
            let request = build_request(link, messages.clone());

            debug!(
                link = link.name(),
                model = link.model(),
                attempt,
                "Calling model"
            );

            match self.attempt(request).await {
                Ok((response, result)) => {
                    return Ok(ModelInvocation {
                        response,
                        sent_messages: messages,
                        result,
                        attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(
                        link = link.name(),
                        attempt,
                        retries,
                        error = %e,
                        "Model call failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.provider_message())
            .unwrap_or_else(|| "No attempts were made".to_string());

        Err(ChainError::provider(link.name(), retries, message))
    }

    async fn attempt(&self, request: LlmRequest) -> Result<(LlmResponse, Value), DomainError> {
        let response = self.provider.complete(request).await?;
        let result = extract_result(&response).map_err(|e| {
            DomainError::provider(
                self.provider.provider_name(),
                format!("Invalid function call arguments: {}", e),
            )
        })?;

        Ok((response, result))
    }
}

fn has_prompt(link: &ModelLink) -> bool {
    let has_templates = link.templates().is_some_and(|t| !t.is_empty());
    let has_messages = link.messages().is_some_and(|m| !m.is_empty());

    has_templates || has_messages
}

/// Messages for one attempt: rendered templates win over static messages
fn render_messages(link: &ModelLink, results: &LinkResults) -> Vec<Message> {
    match link.templates() {
        Some(templates) if !templates.is_empty() => templates.render(Some(results)),
        _ => link.messages().map(<[Message]>::to_vec).unwrap_or_default(),
    }
}

fn build_request(link: &ModelLink, messages: Vec<Message>) -> LlmRequest {
    let mut builder = LlmRequest::builder(link.model()).messages(messages);

    if let Some(temperature) = link.temperature() {
        builder = builder.temperature(temperature);
    }

    if let Some(top_p) = link.top_p() {
        builder = builder.top_p(top_p);
    }

    if let Some(max_tokens) = link.max_tokens() {
        builder = builder.max_tokens(max_tokens);
    }

    if let Some(functions) = link.functions() {
        builder = builder.functions(functions.to_vec());
    }

    if let Some(mode) = link.function_call() {
        builder = builder.function_call(mode.clone());
    }

    builder.build()
}

/// The link result carried by a completion.
///
/// A function call yields its parsed arguments; otherwise the text content.
pub fn extract_result(response: &LlmResponse) -> Result<Value, serde_json::Error> {
    match &response.function_call {
        Some(call) => serde_json::from_str(&call.arguments),
        None => Ok(Value::String(response.content().to_string())),
    }
}
