use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;

use crate::config::OcrConfig;
use crate::error::ChefError;

/// Text recognition through the Google Cloud Vision API
pub struct VisionOcr {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl VisionOcr {
    /// The key is resolved lazily so a missing one only fails image imports
    pub fn new(config: &OcrConfig) -> Self {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Read an image file and return the text found in it.
    ///
    /// An image without any text yields an empty string.
    pub async fn recognize_file(&self, path: &Path) -> Result<String, ChefError> {
        let image_data = tokio::fs::read(path).await?;
        self.recognize(&image_data).await
    }

    pub async fn recognize(&self, image_data: &[u8]) -> Result<String, ChefError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ChefError::MissingApiKey("GOOGLE_API_KEY"))?;

        let url = format!("{}/v1/images:annotate", self.base_url);
        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image_data)
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }]
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(ChefError::Ocr(format!(
                "Google Vision API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        if let Some(message) = response_body["responses"][0]["error"]["message"].as_str() {
            return Err(ChefError::Ocr(message.to_string()));
        }

        // All detected text sits in the first response's full annotation
        let text = response_body["responses"][0]["fullTextAnnotation"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        debug!("Extracted text from image: {} characters", text.len());
        Ok(text)
    }
}
