//! Chain runner - executes links in order and aggregates the report

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::entity::{Chain, Link};
use super::error::ChainError;
use super::executor::LinkExecutor;
use super::results::LinkResults;
use crate::domain::llm::{LlmProvider, LlmResponse, Message};

/// Chain-wide settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Attempts for model links without their own override
    #[serde(default)]
    pub retries: Option<u32>,
}

impl ChainConfig {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Aggregated outcome of a chain run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainReport {
    /// Result of the last link
    pub final_result: Value,
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Raw provider responses, by model link name
    pub responses: BTreeMap<String, LlmResponse>,
    /// Every link's result, in chain order
    pub link_results: LinkResults,
    /// Messages sent, by model link name
    pub messages: BTreeMap<String, Vec<Message>>,
}

impl ChainReport {
    pub fn result(&self, link: &str) -> Option<&Value> {
        self.link_results.get(link)
    }
}

/// Runs chains against a provider
#[derive(Debug, Clone)]
pub struct ChainRunner {
    executor: LinkExecutor,
}

impl ChainRunner {
    pub fn new(provider: Arc<dyn LlmProvider>, config: ChainConfig) -> Self {
        Self {
            executor: LinkExecutor::new(provider, config.retries),
        }
    }

    /// Validate the links into a chain, then run it
    pub async fn run_links(&self, links: Vec<Link>) -> Result<ChainReport, ChainError> {
        let chain = Chain::new(links)?;
        self.run(&chain).await
    }

    /// Run every link in order. The first failure aborts the run.
    pub async fn run(&self, chain: &Chain) -> Result<ChainReport, ChainError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("chain_run", %run_id, links = chain.len());

        self.run_inner(chain).instrument(span).await
    }

    async fn run_inner(&self, chain: &Chain) -> Result<ChainReport, ChainError> {
        let start = Instant::now();

        let mut results = LinkResults::new();
        let mut responses = BTreeMap::new();
        let mut messages = BTreeMap::new();
        let mut prompt_tokens: u64 = 0;
        let mut completion_tokens: u64 = 0;

        for (index, link) in chain.links().iter().enumerate() {
            let link_start = Instant::now();
            debug!(link = link.name(), index, "Executing link");

            let outcome = self
                .executor
                .execute(link, &results, index)
                .await
                .inspect_err(|e| warn!(link = link.name(), index, error = %e, "Link failed"))?;

            if let Some(usage) = outcome.response.as_ref().and_then(|r| r.usage.as_ref()) {
                prompt_tokens += u64::from(usage.prompt_tokens);
                completion_tokens += u64::from(usage.completion_tokens);
            }

            if let Some(sent) = outcome.sent_messages {
                messages.insert(outcome.name.clone(), sent);
            }

            if let Some(response) = outcome.response {
                responses.insert(outcome.name.clone(), response);
            }

            results.insert(outcome.name, outcome.result)?;

            debug!(
                link = link.name(),
                elapsed_ms = link_start.elapsed().as_millis() as u64,
                "Link completed"
            );
        }

        let final_result = results
            .last()
            .map(|(_, value)| value.clone())
            .ok_or(ChainError::EmptyChain)?;

        let total_tokens = prompt_tokens + completion_tokens;

        info!(
            links = chain.len(),
            prompt_tokens,
            completion_tokens,
            total_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chain completed"
        );

        Ok(ChainReport {
            final_result,
            total_tokens,
            prompt_tokens,
            completion_tokens,
            responses,
            link_results: results,
            messages,
        })
    }
}
