use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::FetchConfig;
use crate::error::ChefError;

#[derive(Serialize)]
struct ContentRequest {
    url: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
}

/// Client for a headless-browser rendering service. Used for pages whose
/// recipe only appears after scripts run.
pub struct ChromeFetcher {
    endpoint: String,
    client: Client,
}

impl ChromeFetcher {
    /// `None` unless `page_scriber_url` is configured
    pub fn new(config: &FetchConfig) -> Option<Self> {
        let page_scriber_url = config.page_scriber_url.as_deref()?;
        let endpoint = format!(
            "{}/api/fetch-content",
            page_scriber_url.trim_end_matches('/')
        );
        Some(Self {
            endpoint,
            client: Client::new(),
        })
    }

    /// Rendered text content of `url`
    pub async fn fetch(&self, url: &str) -> Result<String, ChefError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ContentRequest {
                url: url.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChefError::Extraction(format!(
                "Chrome fetch failed with status: {}",
                response.status()
            )));
        }

        let content: ContentResponse = response.json().await?;
        Ok(content.content)
    }
}
