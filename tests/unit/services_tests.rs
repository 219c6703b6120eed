/*!
 * Tests for the translation gateway and holistic rewriter services
 */

use std::sync::Arc;

use academicplot::app_config::{Config, ServiceProvider};
use academicplot::errors::{RewriteError, TranslationError};
use academicplot::pipeline::RunOptions;
use academicplot::providers::mock::MockProvider;
use academicplot::services::{
    self, HolisticRewriter, LlmRewriter, LlmTranslator, ServiceSet, TranslationCache, TranslationGateway,
    validate_rewrite,
};
use academicplot::source::{PlotRules, StyleConfig};

use crate::common::{self, SINE_SCRIPT};

fn json_answer(_: &academicplot::providers::mock::MockRequest) -> String {
    "```json\n{\"Sine wave\": \"正弦波\", \"Amplitude\": \"振幅\", \"Unrequested\": \"x\"}\n```".to_string()
}

fn translator(provider: MockProvider, cache: TranslationCache) -> LlmTranslator<MockProvider> {
    LlmTranslator::new(provider, ("en", "English"), ("zh", "Chinese"), cache)
}

#[tokio::test]
async fn test_llmTranslator_withFencedJson_shouldKeepRequestedKeys() {
    let gateway = translator(MockProvider::replying(json_answer), TranslationCache::new(false));
    let texts = common::translation_map(&[("Sine wave", "Sine wave"), ("Amplitude", "Amplitude")]);

    let translated = gateway.translate(&texts).await.unwrap();

    assert_eq!(
        translated,
        common::translation_map(&[("Amplitude", "振幅"), ("Sine wave", "正弦波")])
    );
}

#[tokio::test]
async fn test_llmTranslator_withSharedCache_shouldNotRepeatRequests() {
    let cache = TranslationCache::new(true);
    let provider = MockProvider::replying(json_answer);
    let first = translator(provider.clone(), cache.clone());
    let second = translator(provider.clone(), cache.clone());
    let texts = common::translation_map(&[("Sine wave", "Sine wave")]);

    first.translate(&texts).await.unwrap();
    let again = second.translate(&texts).await.unwrap();

    assert_eq!(provider.request_count(), 1);
    assert_eq!(again.get("Sine wave").map(String::as_str), Some("正弦波"));
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_llmTranslator_withProseAnswer_shouldBeMalformed() {
    let gateway = translator(
        MockProvider::replying(|_| "I cannot translate that.".to_string()),
        TranslationCache::new(false),
    );
    let texts = common::translation_map(&[("Sine wave", "Sine wave")]);

    let error = gateway.translate(&texts).await.unwrap_err();
    assert!(matches!(error, TranslationError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_llmRewriter_withFencedScript_shouldReturnValidCode() {
    let rewriter = LlmRewriter::new(MockProvider::replying(|_| {
        "```python\nimport matplotlib.pyplot as plt\nplt.show()\n```".to_string()
    }));
    let instructions = vec!["Rebalance the layout".to_string()];

    let answer = rewriter.rewrite(SINE_SCRIPT, &instructions).await.unwrap();
    let accepted = validate_rewrite(&answer, &PlotRules::matplotlib()).unwrap();

    assert_eq!(accepted, "import matplotlib.pyplot as plt\nplt.show()");
}

#[tokio::test]
async fn test_llmRewriter_withoutInstructions_shouldNotBeRequested() {
    let provider = MockProvider::working();
    let rewriter = LlmRewriter::new(provider.clone());

    let error = rewriter.rewrite(SINE_SCRIPT, &[]).await.unwrap_err();

    assert!(matches!(error, RewriteError::NotRequested));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_pipeline_withMockBackedServices_shouldTranslateAndRestyle() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    // The rewrite answer is prose, so the deterministic style block is used
    let rewriter = LlmRewriter::new(MockProvider::replying(|_| "Here you go!".to_string()));
    let pipeline = common::bare_pipeline()
        .with_translator(Arc::new(translator(
            MockProvider::replying(json_answer),
            TranslationCache::new(true),
        )))
        .with_rewriter(Arc::new(rewriter));

    let options = RunOptions {
        style: Some(StyleConfig::default()),
        ..Default::default()
    };
    let result = pipeline.start(&input, options).finish().await;

    assert!(result.is_success());
    assert!(result.text.contains("plt.title('正弦波')"));
    assert!(result.text.contains("plt.ylabel(\"振幅\")"));
    assert!(result.text.contains("# --- Nature academic style ---"));
    assert!(result.text.contains("plt.rcParams['font.sans-serif'] = ['SimHei']"));
    Ok(())
}

#[test]
fn test_serviceSet_fromConfig_shouldBuildForEveryProvider() {
    for provider in [ServiceProvider::DeepSeek, ServiceProvider::OpenAI, ServiceProvider::Anthropic] {
        let mut config = Config::default();
        config.service.provider = provider;
        assert!(ServiceSet::from_config(&config, TranslationCache::default()).is_ok());
    }
}

#[test]
fn test_serviceSet_fromConfig_withInvalidLanguage_shouldFail() {
    let mut config = Config::default();
    config.target_language = "klingon".to_string();
    assert!(ServiceSet::from_config(&config, TranslationCache::default()).is_err());
}

#[tokio::test]
async fn test_testConnection_withClosedPort_shouldFail() {
    let mut config = Config::default();
    let provider = config.service.active_provider_config_mut();
    provider.endpoint = "http://127.0.0.1:9".to_string();
    provider.timeout_secs = 2;

    assert!(services::test_connection(&config).await.is_err());
}
