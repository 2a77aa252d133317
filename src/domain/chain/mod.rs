//! Link chain domain - link types, execution and reporting
//!
//! A chain is an ordered list of links. Each link is either a function or a
//! model call; every result is stored under the link's name and can be
//! referenced from later prompt templates as `{{name}}` or `{{name.field}}`.

mod entity;
mod error;
mod executor;
mod function;
mod invoker;
mod results;
mod runner;

pub use entity::{Chain, Link, ModelLink, DEFAULT_RETRIES};
pub use error::ChainError;
pub use executor::{function_args, is_empty_result, LinkExecutor, LinkOutcome};
pub use function::{FunctionArgs, FunctionFuture, FunctionLink};
pub use invoker::{extract_result, ModelInvocation, ModelInvoker};
pub use results::{LinkResults, PathLookup};
pub use runner::{ChainConfig, ChainReport, ChainRunner};
