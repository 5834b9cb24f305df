use crate::config::ProviderConfig;
use crate::error::ChefError;
use crate::providers::LlmProvider;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ChefError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or(ChefError::MissingApiKey("OPENAI_API_KEY"))?;

        Ok(OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
            max_tokens: 4000,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ChefError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "temperature": self.temperature,
                "max_tokens": self.max_tokens,
                "messages": [
                    {"role": "system", "content": system},
                    {"role": "user", "content": prompt}
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let response_body: Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(ChefError::Provider(format!(
                    "OpenAI API returned status {}: {}",
                    status, body
                )))
            }
            Err(e) => return Err(e.into()),
        };
        debug!("OpenAI response: {:?}", response_body);

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let message = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            return Err(ChefError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, message
            )));
        }
        if !status.is_success() {
            return Err(ChefError::Provider(format!(
                "OpenAI API returned status {}",
                status
            )));
        }

        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ChefError::Provider("Failed to extract content from OpenAI response".to_string())
            })?
            .to_string();

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_complete() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer fake_api_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{
                        "message": {
                            "content": "[JSON_START]{\"recipeName\": \"Soup\", \"ingredients\": []}[JSON_END]"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o".to_string(),
        );

        let result = provider.complete("system", "prompt").await.unwrap();
        assert!(result.contains("recipeName"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "Invalid request"}}"#)
            .create_async()
            .await;

        let provider = OpenAIProvider::with_base_url(
            "fake_api_key".to_string(),
            server.url(),
            "gpt-4o".to_string(),
        );

        let err = provider.complete("system", "prompt").await.unwrap_err();
        assert!(err.to_string().contains("Invalid request"));
        mock.assert_async().await;
    }

    #[test]
    fn test_new_uses_configured_key() {
        let config = ProviderConfig {
            enabled: true,
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            max_tokens: 4000,
            api_key: Some("test-key".to_string()),
            base_url: None,
        };

        let provider = OpenAIProvider::new(&config).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }
}
