use thiserror::Error;

use crate::providers::ResponseError;

/// Errors that can occur while turning recipes into a shopping list
#[derive(Error, Debug)]
pub enum ChefError {
    /// Reading or writing a working file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A structured file could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to fetch a URL
    #[error("Failed to fetch URL: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Input is neither a URL nor an existing file
    #[error("Invalid recipe source: {0}")]
    InvalidSource(String),

    /// Recipe text could not be extracted from the source
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// The OCR service failed or returned no usable text
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The LLM provider returned an error or an unusable reply
    #[error("Provider error: {0}")]
    Provider(String),

    /// The LLM reply did not contain a usable JSON document
    #[error("Malformed model response: {0}")]
    Response(#[from] ResponseError),

    /// A recipe file failed validation
    #[error("Invalid recipe document: {0}")]
    InvalidRecipe(String),

    /// No API key was configured for a service
    #[error("{0} not found in config or environment")]
    MissingApiKey(&'static str),
}
