/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::str::FromStr;

use academicplot::app_config::{Config, LogLevel, ServiceProvider};
use academicplot::source::{Layout, VectorFormat};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "zh");
    assert_eq!(config.service.provider, ServiceProvider::DeepSeek);
    assert_eq!(config.service.get_model(), "deepseek-chat");
    assert_eq!(config.service.get_endpoint(), "https://api.deepseek.com");
    assert_eq!(config.service.get_timeout_secs(), 180);
    assert_eq!(config.output.revision_suffix, "zh_revision");
    assert_eq!(config.output.figure_suffix, "figure");
    assert!(!config.style.enabled);
    assert_eq!(config.style.style.preset, "nature");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.service.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.service.active_provider_config_mut().endpoint = String::new();
    assert!(config.validate().is_ok());

    config.service.active_provider_config_mut().timeout_secs = 0;
    assert!(config.validate().is_err());
    config.service.active_provider_config_mut().timeout_secs = 30;

    config.output.revision_suffix = "  ".to_string();
    assert!(config.validate().is_err());
}

/// An unknown preset only produces a warning
#[test]
fn test_config_validation_withUnknownPreset_shouldStillPass() {
    let mut config = Config::default();
    config.style.style.preset = "siggraph".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validateCredentials_withConfiguredKey_shouldPass() {
    let mut config = Config::default();
    config.service.provider = ServiceProvider::Anthropic;
    config.service.active_provider_config_mut().api_key = "sk-test".to_string();

    assert!(config.validate_credentials().is_ok());
    assert_eq!(config.service.get_api_key(), "sk-test");
    assert_eq!(config.service.get_model(), "claude-3-5-haiku-latest");
}

#[test]
fn test_config_fromPartialJson_shouldFillDefaults() -> Result<()> {
    let json = r#"{
        "target_language": "ja",
        "service": { "provider": "openai" },
        "style": {
            "enabled": true,
            "preset": "cvpr",
            "layout": "double",
            "resolution": 600,
            "overrides": { "font_size": 9 },
            "vector_format": "pdf"
        }
    }"#;

    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "ja");
    assert_eq!(config.service.provider, ServiceProvider::OpenAI);
    assert_eq!(config.service.get_model(), "gpt-4o-mini");
    assert_eq!(config.service.get_endpoint(), "https://api.openai.com/v1");
    assert!(config.style.enabled);
    assert_eq!(config.style.style.preset, "cvpr");
    assert_eq!(config.style.style.layout, Layout::Double);
    assert_eq!(config.style.style.resolution, Some(600));
    assert_eq!(config.style.style.overrides.font_size, Some(9.0));
    assert_eq!(config.style.vector_format, Some(VectorFormat::Pdf));
    Ok(())
}

#[test]
fn test_config_saveThenLoad_shouldKeepValues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.style.enabled = true;
    config.style.style.preset = "science".to_string();
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.target_language, "fr");
    assert!(loaded.style.enabled);
    assert_eq!(loaded.style.style.preset, "science");
    Ok(())
}

#[test]
fn test_config_loadOrCreate_withMissingFile_shouldWriteDefault() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.target_language, "zh");
    Ok(())
}

#[test]
fn test_serviceProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(ServiceProvider::from_str("DeepSeek").unwrap(), ServiceProvider::DeepSeek);
    assert_eq!(ServiceProvider::from_str("OPENAI").unwrap(), ServiceProvider::OpenAI);
    assert_eq!(ServiceProvider::from_str("anthropic").unwrap(), ServiceProvider::Anthropic);
    assert!(ServiceProvider::from_str("ollama").is_err());
    assert_eq!(ServiceProvider::Anthropic.to_string(), "anthropic");
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
