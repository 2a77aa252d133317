use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error detail returned by a provider alongside a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorDetail {
    pub message: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ProviderErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
            code: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Core domain errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: String,
        message: String,
        detail: Option<ProviderErrorDetail>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            detail: None,
        }
    }

    pub fn provider_with_detail(
        provider: impl Into<String>,
        message: impl Into<String>,
        detail: ProviderErrorDetail,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            detail: Some(detail),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The most specific message available for this error.
    ///
    /// Provider errors carrying a structured detail report the provider's own
    /// message; everything else falls back to the display form.
    pub fn provider_message(&self) -> String {
        match self {
            Self::Provider {
                detail: Some(detail),
                ..
            } => detail.message.clone(),
            other => other.to_string(),
        }
    }
}
