mod app_config;

pub use app_config::{AppConfig, ChainSettings, LlmConfig, LogFormat, LoggingConfig};
