//! Run command - executes a chain definition against the configured model endpoint

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{ChainConfig, ChainReport, ChainRunner, FunctionLink, Link, LlmProvider};
use crate::infrastructure::llm::{HttpClient, OpenAiProvider};
use crate::infrastructure::{logging, ChainDefinition};

/// Arguments for the run command
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Chain definition file (.toml or .json)
    #[arg(long, short = 'c')]
    pub chain: PathBuf,

    /// Seed a literal value as a leading link, e.g. `--set initial=i`
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Attempts per model link (overrides the definition and config)
    #[arg(long)]
    pub retries: Option<u32>,

    /// Pretty-print the report
    #[arg(long)]
    pub pretty: bool,
}

/// Run a chain and print its report
pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    let provider = build_provider(&config)?;
    let report = execute(&args, &config, provider).await?;

    println!("{}", render_report(&report, args.pretty)?);

    Ok(())
}

fn build_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let api_key = config
        .llm
        .resolve_api_key()
        .context("No API key configured: set APP__LLM__API_KEY or OPENAI_API_KEY")?;

    let client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;

    Ok(Arc::new(OpenAiProvider::with_base_url(
        client,
        api_key,
        config.llm.base_url.clone(),
    )))
}

/// Load the definition, seed the `--set` values and run the chain
pub async fn execute(
    args: &RunArgs,
    config: &AppConfig,
    provider: Arc<dyn LlmProvider>,
) -> anyhow::Result<ChainReport> {
    let definition = ChainDefinition::load(&args.chain)
        .with_context(|| format!("Failed to load chain {}", args.chain.display()))?;

    let (definition_config, model_links) = definition.into_parts();
    let chain_config = ChainConfig {
        retries: args
            .retries
            .or(definition_config.retries)
            .or(config.chain.retries),
    };

    let mut links = seed_links(&args.set);
    links.extend(model_links);

    info!(
        chain = %args.chain.display(),
        links = links.len(),
        provider = provider.provider_name(),
        "Running chain"
    );

    let runner = ChainRunner::new(provider, chain_config);
    let report = runner.run_links(links).await.context("Chain run failed")?;

    Ok(report)
}

/// One constant function link per `--set`, in the order given
pub fn seed_links(assignments: &[(String, String)]) -> Vec<Link> {
    assignments
        .iter()
        .map(|(name, value)| {
            Link::from(FunctionLink::constant(
                name.clone(),
                Value::String(value.clone()),
            ))
        })
        .collect()
}

pub fn render_report(report: &ChainReport, pretty: bool) -> anyhow::Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };

    output.context("Failed to serialize chain report")
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", raw))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing link name in `{}`", raw));
    }

    Ok((name.to_string(), value.to_string()))
}
