//! PMP LLM Chain
//!
//! Runs an ordered chain of links, each either a plain function or a call to
//! an LLM completion endpoint. Every link's result is kept under its name and
//! can be referenced from later prompt templates as `{{name.field}}`.
//! - Conditional, templated prompt blocks
//! - Bounded retry with structured function-call results
//! - Token accounting across the whole run

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
