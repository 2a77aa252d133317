//! Infrastructure layer - External service implementations

pub mod definition;
pub mod llm;
pub mod logging;

pub use definition::{ChainDefinition, LinkDefinition};
