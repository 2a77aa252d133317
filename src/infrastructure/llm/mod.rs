//! LLM provider implementations

mod http_client;
mod openai;

pub use http_client::{error_from_body, HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;
