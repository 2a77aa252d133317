//! Chain error types

use thiserror::Error;

/// Errors that can occur while building or running a chain
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    #[error("Chain has no links")]
    EmptyChain,

    #[error("Duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("Link '{link}' is misconfigured: {message}")]
    Configuration { link: String, message: String },

    #[error("Link '{link}' failed after {attempts} attempt(s): {message}")]
    Provider {
        link: String,
        attempts: u32,
        message: String,
    },

    #[error("Function link '{link}' failed: {message}")]
    Function { link: String, message: String },

    #[error("Link '{link}' produced an empty result")]
    EmptyResult { link: String },
}

impl ChainError {
    pub fn duplicate_link(name: impl Into<String>) -> Self {
        Self::DuplicateLink(name.into())
    }

    pub fn configuration(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            link: link.into(),
            message: message.into(),
        }
    }

    pub fn provider(link: impl Into<String>, attempts: u32, message: impl Into<String>) -> Self {
        Self::Provider {
            link: link.into(),
            attempts,
            message: message.into(),
        }
    }

    pub fn function(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Function {
            link: link.into(),
            message: message.into(),
        }
    }

    pub fn empty_result(link: impl Into<String>) -> Self {
        Self::EmptyResult { link: link.into() }
    }

    /// Name of the link that raised this error, if any
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::EmptyChain => None,
            Self::DuplicateLink(name) => Some(name),
            Self::Configuration { link, .. }
            | Self::Provider { link, .. }
            | Self::Function { link, .. }
            | Self::EmptyResult { link } => Some(link),
        }
    }
}
