mod anthropic;
mod factory;
mod open_ai;
mod prompt;
mod response;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use open_ai::OpenAIProvider;
pub use prompt::{
    build_consolidate_prompt, build_normalize_prompt, CONSOLIDATE_SYSTEM_PROMPT,
    NORMALIZE_SYSTEM_PROMPT, RECIPE_NAME_PLACEHOLDER,
};
pub use response::{extract_json_block, parse_json_block, ResponseError};

use async_trait::async_trait;

use crate::error::ChefError;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one system + user message pair and return the model's reply text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ChefError>;
}
