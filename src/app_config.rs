use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration module
/// This module handles loading, validating and saving the configuration
/// and resolves the immutable model record used for chunk budgeting.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Immutable description of the model used for translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Identifier understood by the token counter and the provider
    pub name: String,

    /// Context window of the model in tokens
    pub max_context_tokens: usize,
}

impl ModelConfig {
    /// Create a model record
    pub fn new(name: impl Into<String>, max_context_tokens: usize) -> Self {
        Self {
            name: name.into(),
            max_context_tokens,
        }
    }

    /// Look a model up in the static registry
    pub fn from_registry(name: &str) -> Option<Self> {
        MODEL_REGISTRY
            .get(name)
            .map(|tokens| Self::new(name, *tokens))
    }

    /// Token budget of one chunk: the context scaled by `ratio`, rounded down
    pub fn token_budget(&self, ratio: f64) -> usize {
        (self.max_context_tokens as f64 * ratio).floor() as usize
    }
}

// @const: Context sizes of the models known without configuration
static MODEL_REGISTRY: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HashMap::from([
        ("gpt-3.5-turbo-1106", 4_096),
        ("gpt-3.5-turbo", 4_096),
        ("gpt-4", 8_192),
        ("gpt-4-turbo", 128_000),
        ("gpt-4o", 128_000),
        ("gpt-4o-mini", 128_000),
        ("claude-3-haiku-20240307", 200_000),
        ("claude-3-5-sonnet-20240620", 200_000),
    ])
});

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI chat completions
    #[default]
    OpenAI,
    // @provider: Anthropic messages
    Anthropic,
    // @provider: Offline echo translator
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    // @returns: Environment variable the CLI reads the API key from
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Mock => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_openai_rate_limit(),
            },
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
                rate_limit: default_anthropic_rate_limit(),
            },
            TranslationProvider::Mock => Self {
                provider_type: "mock".to_string(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Context size override for models missing from the registry
    #[serde(default)]
    pub max_context_tokens: Option<usize>,

    /// Share of the context a chunk's rows may use; the rest is headroom
    /// for the instructions and the translated column
    #[serde(default = "default_token_budget_ratio")]
    pub token_budget_ratio: f64,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Instruction template sent with every table
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for rate-limited or dropped requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Sampling temperature, provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Nucleus sampling, provider default when unset
    #[serde(default)]
    pub top_p: Option<f32>,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: None,
            top_p: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo-1106".to_string()
}

fn default_token_budget_ratio() -> f64 {
    0.64
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_openai_rate_limit() -> Option<u32> {
    Some(60)
}

fn default_anthropic_rate_limit() -> Option<u32> {
    // Slightly below Anthropic's standard 50 requests per minute
    Some(45)
}

fn default_system_prompt() -> String {
    crate::translation::prompts::PromptTemplate::TABLE_TRANSLATOR.to_string()
}

impl Config {
    /// Load a configuration file, writing the default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values.
    ///
    /// Failures are reported as `AppError::Config`.
    pub fn validate(&self) -> Result<()> {
        let config_error = |message: String| anyhow::Error::new(AppError::Config(message));

        crate::language_utils::validate_language_code(&self.source_language)
            .map_err(|e| config_error(format!("source_language: {}", e)))?;
        crate::language_utils::validate_language_code(&self.target_language)
            .map_err(|e| config_error(format!("target_language: {}", e)))?;

        let ratio = self.translation.token_budget_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(config_error(format!("token_budget_ratio must be within (0, 1], got {}", ratio)));
        }

        let model = self.translation.model_config().map_err(|e| config_error(e.to_string()))?;
        if model.token_budget(ratio) == 0 {
            return Err(config_error(format!("Model {} leaves no token budget for chunks", model.name)));
        }

        if self.translation.provider != TranslationProvider::Mock && self.translation.get_api_key().is_empty() {
            return Err(config_error(format!(
                "Translation API key is required for {} provider",
                self.translation.provider.display_name()
            )));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "fr".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Resolve the model record from the override or the registry
    pub fn model_config(&self) -> Result<ModelConfig> {
        if let Some(tokens) = self.max_context_tokens {
            return Ok(ModelConfig::new(self.model.clone(), tokens));
        }

        ModelConfig::from_registry(&self.model).ok_or_else(|| {
            anyhow!(
                "Unknown model '{}': set translation.max_context_tokens in the configuration",
                self.model
            )
        })
    }

    /// Token budget of one chunk for the configured model
    pub fn token_budget(&self) -> Result<usize> {
        Ok(self.model_config()?.token_budget(self.token_budget_ratio))
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(pos) = self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            return &mut self.available_providers[pos];
        }

        self.available_providers.push(ProviderConfig::new(self.provider.clone()));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
            TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_rate_limit(),
            TranslationProvider::Anthropic => default_anthropic_rate_limit(),
            TranslationProvider::Mock => None,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: default_model(),
            max_context_tokens: None,
            token_budget_ratio: default_token_budget_ratio(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
