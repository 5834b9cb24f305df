use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Working directories
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// HTTP fetching of recipe pages
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Image text recognition
    #[serde(default)]
    pub ocr: OcrConfig,
    /// LLM providers used to normalize recipes and consolidate the list
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Locations of the temp and trash directories
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    #[serde(default = "default_trash_dir")]
    pub trash_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            trash_dir: default_trash_dir(),
        }
    }
}

/// Configuration for fetching recipe web pages
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub timeout: u64,
    /// Number of attempts for gateway errors (502, 503, 504, 522, 524)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Delay between attempts in milliseconds, multiplied by the attempt number
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Base URL of a page rendering service used when plain fetching finds nothing
    pub page_scriber_url: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: default_user_agent(),
            page_scriber_url: None,
        }
    }
}

/// Configuration for the Google Cloud Vision OCR service
#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    /// API key (can also be set via GOOGLE_API_KEY)
    pub api_key: Option<String>,
    #[serde(default = "default_ocr_base_url")]
    pub base_url: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ocr_base_url(),
        }
    }
}

/// LLM provider selection
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Provider used when none is specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: default_providers(),
        }
    }
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o", "claude-3-5-sonnet-20240620")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

// Default value functions
fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_trash_dir() -> PathBuf {
    PathBuf::from("trash")
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_ocr_base_url() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: true,
            model: "gpt-4o".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        },
    );
    providers.insert(
        "anthropic".to_string(),
        ProviderConfig {
            enabled: true,
            model: "claude-3-5-sonnet-20240620".to_string(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        },
    );
    providers
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }
}

/// Load configuration from file and environment variables
///
/// Configuration is loaded with the following priority (highest to lowest):
/// 1. Environment variables with CHEFBUDDY__ prefix
/// 2. The given file, or config.toml in the current directory
/// 3. Default values
///
/// Environment variable format: CHEFBUDDY__LLM__PROVIDERS__OPENAI__API_KEY
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        // An explicitly named file must exist
        Some(path) => File::from(path).required(true),
        None => File::with_name("config").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("CHEFBUDDY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
