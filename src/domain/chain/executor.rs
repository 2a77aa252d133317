//! Link executor - dispatches a single link given the results so far

use std::sync::Arc;

use serde_json::Value;

use super::entity::Link;
use super::error::ChainError;
use super::function::{FunctionArgs, FunctionLink};
use super::invoker::ModelInvoker;
use super::results::LinkResults;
use crate::domain::llm::{LlmProvider, LlmResponse, Message};

/// What one link produced
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub name: String,
    pub result: Value,
    /// Messages sent to the model (model links only)
    pub sent_messages: Option<Vec<Message>>,
    /// Raw provider response (model links only)
    pub response: Option<LlmResponse>,
}

/// Executes links one at a time
#[derive(Debug, Clone)]
pub struct LinkExecutor {
    invoker: ModelInvoker,
    default_retries: Option<u32>,
}

impl LinkExecutor {
    pub fn new(provider: Arc<dyn LlmProvider>, default_retries: Option<u32>) -> Self {
        Self {
            invoker: ModelInvoker::new(provider),
            default_retries,
        }
    }

    /// Execute the link at position `index` of its chain
    pub async fn execute(
        &self,
        link: &Link,
        results: &LinkResults,
        index: usize,
    ) -> Result<LinkOutcome, ChainError> {
        let outcome = match link {
            Link::Function(function) => self.execute_function(function, results, index).await?,
            Link::Model(model) => {
                let retries = model.effective_retries(self.default_retries);
                let invocation = self.invoker.invoke(model, results, retries).await?;

                LinkOutcome {
                    name: model.name().to_string(),
                    result: invocation.result,
                    sent_messages: Some(invocation.sent_messages),
                    response: Some(invocation.response),
                }
            }
        };

        if is_empty_result(&outcome.result) {
            return Err(ChainError::empty_result(outcome.name));
        }

        Ok(outcome)
    }

    async fn execute_function(
        &self,
        function: &FunctionLink,
        results: &LinkResults,
        index: usize,
    ) -> Result<LinkOutcome, ChainError> {
        let args = function_args(results, index);

        let result = function
            .call(args)
            .await
            .map_err(|e| ChainError::function(function.name(), format!("{:#}", e)))?;

        Ok(LinkOutcome {
            name: function.name().to_string(),
            result,
            sent_messages: None,
            response: None,
        })
    }
}

/// Arguments for a function link.
///
/// A structured result from the link just before is passed on by itself;
/// otherwise the function sees every result so far, keyed by link name.
pub fn function_args(results: &LinkResults, index: usize) -> FunctionArgs {
    if index > 0 {
        if let Some((_, Value::Object(previous))) = results.last() {
            return FunctionArgs::new(previous.clone());
        }
    }

    FunctionArgs::new(results.to_object())
}

/// Falsy JSON values: null, empty string, false and zero
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::ModelLink;
    use crate::domain::llm::{MockLlmProvider, ScriptedLlmProvider};
    use serde_json::json;

    fn executor_without_provider() -> LinkExecutor {
        let mut provider = MockLlmProvider::new();
        provider.expect_complete().never();
        LinkExecutor::new(Arc::new(provider), None)
    }

    fn echo_args(name: &str) -> Link {
        FunctionLink::new(name, |args| Ok(Value::Object(args.into_inner()))).into()
    }

    #[tokio::test]
    async fn test_first_function_receives_empty_results() {
        let executor = executor_without_provider();
        let outcome = executor
            .execute(
                &FunctionLink::constant("step1", json!("i")).into(),
                &LinkResults::new(),
                0,
            )
            .await
            .unwrap();

        assert_eq!(outcome.name, "step1");
        assert_eq!(outcome.result, json!("i"));
        assert!(outcome.sent_messages.is_none());
        assert!(outcome.response.is_none());
    }

    #[tokio::test]
    async fn test_function_after_structured_result_receives_it() {
        let executor = executor_without_provider();
        let mut results = LinkResults::new();
        results.insert("step1", json!("i")).unwrap();
        results
            .insert("step2", json!({ "name": "Ivan", "gender": "boy" }))
            .unwrap();

        let outcome = executor
            .execute(&echo_args("step3"), &results, 2)
            .await
            .unwrap();

        assert_eq!(outcome.result, json!({ "name": "Ivan", "gender": "boy" }));
    }

    #[tokio::test]
    async fn test_function_after_text_result_receives_all_results() {
        let executor = executor_without_provider();
        let mut results = LinkResults::new();
        results.insert("step1", json!("i")).unwrap();
        results.insert("step2", json!("Ivan")).unwrap();

        let outcome = executor
            .execute(&echo_args("step3"), &results, 2)
            .await
            .unwrap();

        assert_eq!(outcome.result, json!({ "step1": "i", "step2": "Ivan" }));
    }

    #[test]
    fn test_function_args_at_index_zero_ignore_results() {
        let mut results = LinkResults::new();
        results.insert("seed", json!({ "x": 1 })).unwrap();

        // position zero never inherits a previous structured result
        let args = function_args(&results, 0);
        assert_eq!(args.get("seed"), Some(&json!({ "x": 1 })));
    }

    #[tokio::test]
    async fn test_function_error_is_reported_with_link_name() {
        let executor = executor_without_provider();
        let link: Link = FunctionLink::new("parse", |args| {
            let person: serde_json::Map<String, Value> = args.parse()?;
            anyhow::ensure!(person.contains_key("name"), "name is required");
            Ok(json!("unreachable"))
        })
        .into();

        let err = executor
            .execute(&link, &LinkResults::new(), 0)
            .await
            .unwrap_err();

        assert_eq!(err, ChainError::function("parse", "name is required"));
    }

    #[tokio::test]
    async fn test_empty_function_result_fails() {
        let executor = executor_without_provider();

        for empty in [json!(""), json!(null), json!(false), json!(0)] {
            let link: Link = FunctionLink::constant("blank", empty).into();
            let err = executor
                .execute(&link, &LinkResults::new(), 0)
                .await
                .unwrap_err();

            assert_eq!(err, ChainError::empty_result("blank"));
        }
    }

    #[tokio::test]
    async fn test_empty_model_result_fails() {
        let provider = ScriptedLlmProvider::new().with_response(LlmResponse::new(
            "r",
            "gpt-4o",
            Message::assistant(""),
        ));
        let executor = LinkExecutor::new(Arc::new(provider), None);
        let link: Link = ModelLink::new("silent", "gpt-4o")
            .with_messages(vec![Message::user("Say nothing")])
            .into();

        let err = executor
            .execute(&link, &LinkResults::new(), 0)
            .await
            .unwrap_err();

        assert_eq!(err, ChainError::empty_result("silent"));
    }

    #[tokio::test]
    async fn test_model_link_uses_chain_default_retries() {
        let provider = Arc::new(
            ScriptedLlmProvider::new()
                .with_error(crate::domain::DomainError::provider("scripted", "down"))
                .with_error(crate::domain::DomainError::provider("scripted", "down")),
        );
        let executor = LinkExecutor::new(provider.clone(), Some(2));
        let link: Link = ModelLink::new("flaky", "gpt-4o")
            .with_messages(vec![Message::user("Hi")])
            .into();

        let err = executor
            .execute(&link, &LinkResults::new(), 0)
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::Provider { attempts: 2, .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_is_empty_result() {
        assert!(is_empty_result(&json!(null)));
        assert!(is_empty_result(&json!("")));
        assert!(is_empty_result(&json!(0.0)));
        assert!(!is_empty_result(&json!(" ")));
        assert!(!is_empty_result(&json!({})));
        assert!(!is_empty_result(&json!([])));
        assert!(!is_empty_result(&json!(true)));
        assert!(!is_empty_result(&json!(-1)));
    }
}
