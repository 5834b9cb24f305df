mod fetchers;
mod html;
mod ocr;

pub use fetchers::{ChromeFetcher, RequestFetcher};
pub use html::{extract_body_text, extract_recipe_sections};
pub use ocr::VisionOcr;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::AppConfig;
use crate::error::ChefError;

fn url_pattern() -> &'static Regex {
    static URL_PATTERN: OnceLock<Regex> = OnceLock::new();
    URL_PATTERN.get_or_init(|| Regex::new(r"^(http|https)://\S+$").expect("url pattern is valid"))
}

/// Where a recipe comes from
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeSource {
    Url(String),
    File(PathBuf),
}

impl RecipeSource {
    /// Classify user input as a web address or an existing file
    pub fn parse(input: &str) -> Result<Self, ChefError> {
        let input = input.trim();
        if url_pattern().is_match(input) {
            return Ok(Self::Url(input.to_string()));
        }
        let path = Path::new(input);
        if !input.is_empty() && path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }
        Err(ChefError::InvalidSource(format!(
            "'{}' is not a web address or an existing file \
             (try 'https://example.com/pancakes' or 'recipes/pancakes.jpg')",
            input
        )))
    }

    /// Name used for the working files of this recipe
    pub fn slug(&self) -> String {
        let raw = match self {
            Self::Url(url) => url_slug(url),
            Self::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let slug = raw.replace(['/', '\\'], "_");
        if slug.trim().is_empty() {
            "default".to_string()
        } else {
            slug
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn url_slug(url: &str) -> String {
    let segment = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
    });
    let Some(segment) = segment else {
        return String::new();
    };
    let decoded = urlencoding::decode(&segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.clone())
        .replace(['/', '\\'], "_");
    Path::new(&decoded)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or(decoded)
}

/// Result of looking for recipe text in a source
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(String),
    NotFound,
}

impl Extraction {
    fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            Self::NotFound
        } else {
            Self::Found(text)
        }
    }
}

/// Turns web pages, text files and photos into plain recipe text
pub struct TextExtractor {
    fetcher: RequestFetcher,
    chrome: Option<ChromeFetcher>,
    ocr: VisionOcr,
}

impl TextExtractor {
    pub fn new(config: &AppConfig) -> Result<Self, ChefError> {
        Ok(Self {
            fetcher: RequestFetcher::new(&config.fetch)?,
            chrome: ChromeFetcher::new(&config.fetch),
            ocr: VisionOcr::new(&config.ocr),
        })
    }

    pub async fn extract(&self, source: &RecipeSource) -> Result<Extraction, ChefError> {
        let extraction = match source {
            RecipeSource::Url(url) => self.extract_url(url).await,
            RecipeSource::File(path) => self.extract_file(path).await?,
        };
        match &extraction {
            Extraction::Found(text) => {
                info!("Extracted {} characters from {}", text.len(), source)
            }
            Extraction::NotFound => warn!("No recipe text found in {}", source),
        }
        Ok(extraction)
    }

    /// Section heuristic on the fetched page, then the rendering service.
    /// Fetch failures end up as `NotFound` rather than an error.
    async fn extract_url(&self, url: &str) -> Extraction {
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                if let Some(text) = extract_recipe_sections(&html) {
                    return Extraction::Found(text);
                }
                debug!("No recipe sections in {}", url);
            }
            Err(e) => warn!("Fetching {} failed: {}", url, e),
        }

        let Some(chrome) = &self.chrome else {
            return Extraction::NotFound;
        };
        info!("Trying page rendering service for {}", url);
        match chrome.fetch(url).await {
            Ok(text) => Extraction::from_text(text),
            Err(e) => {
                warn!("Page rendering service failed for {}: {}", url, e);
                Extraction::NotFound
            }
        }
    }

    async fn extract_file(&self, path: &Path) -> Result<Extraction, ChefError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let text = match extension.as_str() {
            "txt" | "md" => tokio::fs::read_to_string(path).await?,
            "html" | "htm" => {
                let html = tokio::fs::read_to_string(path).await?;
                extract_recipe_sections(&html).unwrap_or_else(|| extract_body_text(&html))
            }
            _ => {
                debug!("Treating {} as an image", path.display());
                self.ocr.recognize_file(path).await?
            }
        };
        Ok(Extraction::from_text(text))
    }
}
