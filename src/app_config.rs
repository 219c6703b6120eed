use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::source::{PresetTable, StyleConfig, VectorFormat};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Generation service config
    #[serde(default)]
    pub service: ServiceConfig,

    /// Output naming
    #[serde(default)]
    pub output: OutputConfig,

    /// Default styling request
    #[serde(default)]
    pub style: StyleDefaults,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Generation service type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProvider {
    // @provider: DeepSeek (OpenAI-compatible)
    #[default]
    DeepSeek,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
}

impl ServiceProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepSeek => "DeepSeek",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepSeek => "deepseek".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    // @returns: Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ServiceProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
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

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ServiceProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Generation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: ServiceProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common generation settings
    #[serde(default)]
    pub common: ServiceCommonConfig,
}

/// Generation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceCommonConfig {
    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound for generated tokens; a rewritten script must fit in it
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Reuse translations across runs of one process
    #[serde(default = "default_true")]
    pub cache_translations: bool,
}

impl Default for ServiceCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            cache_translations: true,
        }
    }
}

/// Output naming
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory for revised scripts; the input's directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// `<base>_<revision_suffix><ext>`
    #[serde(default = "default_revision_suffix")]
    pub revision_suffix: String,

    /// `<base>_<figure_suffix>.<format>`
    #[serde(default = "default_figure_suffix")]
    pub figure_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            revision_suffix: default_revision_suffix(),
            figure_suffix: default_figure_suffix(),
        }
    }
}

/// Styling applied when the command line does not say otherwise
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StyleDefaults {
    /// Apply academic styling
    #[serde(default)]
    pub enabled: bool,

    /// Ask for a more balanced subplot layout
    #[serde(default)]
    pub beautify_layout: bool,

    /// Preset, layout, resolution and overrides
    #[serde(flatten)]
    pub style: StyleConfig,

    /// Export format for the figure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_format: Option<VectorFormat>,
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
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_true() -> bool {
    true
}

fn default_revision_suffix() -> String {
    "zh_revision".to_string()
}

fn default_figure_suffix() -> String {
    "figure".to_string()
}

fn default_endpoint(provider: ServiceProvider) -> String {
    match provider {
        ServiceProvider::DeepSeek => "https://api.deepseek.com".to_string(),
        ServiceProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        ServiceProvider::Anthropic => "https://api.anthropic.com".to_string(),
    }
}

fn default_model(provider: ServiceProvider) -> String {
    match provider {
        ServiceProvider::DeepSeek => "deepseek-chat".to_string(),
        ServiceProvider::OpenAI => "gpt-4o-mini".to_string(),
        ServiceProvider::Anthropic => "claude-3-5-haiku-latest".to_string(),
    }
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        crate::file_utils::FileManager::write_atomic(path, &json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Per-user fallback location
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("academicplot").join("conf.json"))
    }

    /// Resolve which file to load: the given path if it exists, else the
    /// per-user file if that exists, else the given path (to be created)
    pub fn locate(path: &Path) -> PathBuf {
        if path.exists() {
            return path.to_path_buf();
        }

        match Self::user_config_path() {
            Some(user_path) if user_path.exists() => user_path,
            _ => path.to_path_buf(),
        }
    }

    /// Load the configuration, writing a default file when none exists
    pub fn load_or_create(path: &Path) -> Result<Self> {
        let located = Self::locate(path);
        if located.exists() {
            return Self::from_file(&located);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;
        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            warn!(
                "Source and target language are both '{}', labels will be sent back unchanged",
                self.target_language
            );
        }

        let endpoint = self.service.get_endpoint();
        url::Url::parse(&endpoint).with_context(|| format!("Invalid service endpoint: {}", endpoint))?;

        if self.service.get_timeout_secs() == 0 {
            return Err(anyhow!("Service timeout must be greater than zero"));
        }

        if self.output.revision_suffix.trim().is_empty() {
            return Err(anyhow!("Output revision suffix must not be empty"));
        }

        if PresetTable::standard().lookup(&self.style.style.preset).is_none() {
            warn!(
                "Unknown style preset '{}' in config, the default preset will be used",
                self.style.style.preset
            );
        }

        Ok(())
    }

    /// Validate that the active provider can be called
    pub fn validate_credentials(&self) -> Result<()> {
        if self.service.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for the {} provider (set it in the config or {})",
                self.service.provider.display_name(),
                self.service.provider.api_key_env_var()
            ));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            service: ServiceConfig::default(),
            output: OutputConfig::default(),
            style: StyleDefaults::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ServiceConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &ServiceProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, inserting defaults
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model(self.provider)
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        std::env::var(self.provider.api_key_env_var()).unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: ServiceProvider::default(),
            available_providers: vec![
                ProviderConfig::new(ServiceProvider::DeepSeek),
                ProviderConfig::new(ServiceProvider::OpenAI),
                ProviderConfig::new(ServiceProvider::Anthropic),
            ],
            common: ServiceCommonConfig::default(),
        }
    }
}
