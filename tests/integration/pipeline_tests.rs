/*!
 * End-to-end tests of a pipeline run over real files
 */

use anyhow::Result;
use futures::StreamExt;
use std::fs;
use std::sync::Arc;

use academicplot::pipeline::{EventKind, PipelineStage, ProgressEvent, RunOptions, SUCCESS_TOKEN};
use academicplot::source::{StyleConfig, VectorFormat};

use crate::common::{self, FakeRewriter, FakeTranslator, RewriteAnswer, SINE_SCRIPT};

fn untranslated() -> RunOptions {
    RunOptions {
        translate: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_withoutAnyOption_shouldOnlyAddFontSupport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    let result = common::bare_pipeline().start(&input, untranslated()).finish().await;

    let expected = common::with_font_block(SINE_SCRIPT, 1);
    assert!(result.is_success());
    assert_eq!(result.text, expected);

    let output = temp_dir.path().join("sine_zh_revision.py");
    assert_eq!(result.output_path.as_deref(), Some(output.as_path()));
    assert_eq!(fs::read_to_string(&output)?, expected);

    // Input is never modified
    assert_eq!(fs::read_to_string(&input)?, SINE_SCRIPT);
    Ok(())
}

#[tokio::test]
async fn test_run_withOverlappingLiterals_shouldMergeLongestFirst() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;
    let translator = Arc::new(FakeTranslator::with(&[
        ("Sine", "正弦"),
        ("Sine wave", "正弦波"),
        ("Generate data", "生成数据"),
        ("Amplitude", "振幅"),
    ]));

    let result = common::bare_pipeline()
        .with_translator(translator.clone())
        .start(&input, RunOptions::default())
        .finish()
        .await;

    assert!(result.is_success());
    assert_eq!(translator.calls(), 1);
    assert!(result.text.contains("label='正弦'"));
    assert!(result.text.contains("plt.title('正弦波')"));
    assert!(result.text.contains("plt.ylabel(\"振幅\")"));
    assert!(result.text.contains("# 生成数据"));
    // Missing from the answer, so left as is
    assert!(result.text.contains("plt.xlabel('Time (s)')"));
    assert_eq!(result.warnings().count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingTranslator_shouldWarnAndKeepOriginalText() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    let result = common::bare_pipeline()
        .with_translator(Arc::new(FakeTranslator::failing()))
        .start(&input, RunOptions::default())
        .finish()
        .await;

    assert!(result.is_success());
    assert_eq!(result.text, common::with_font_block(SINE_SCRIPT, 1));

    let warnings: Vec<&ProgressEvent> = result.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].stage, PipelineStage::Translate);
    Ok(())
}

#[tokio::test]
async fn test_run_withProseRewrite_shouldFallBackToStyleBlock() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;
    let rewriter = Arc::new(FakeRewriter::new(RewriteAnswer::Prose));

    let options = RunOptions {
        translate: false,
        style: Some(StyleConfig::default()),
        ..Default::default()
    };
    let result = common::bare_pipeline()
        .with_rewriter(rewriter.clone())
        .start(&input, options)
        .finish()
        .await;

    assert!(result.is_success());
    assert!(result.text.contains("# --- Nature academic style ---"));
    assert!(result.text.contains("'figure.figsize': (3.35, 2.5),  # Nature single-column width"));
    assert!(!result.text.contains("Sure!"));
    assert!(
        result
            .warnings()
            .any(|event| event.stage == PipelineStage::StyleOrFallback)
    );

    let seen = rewriter.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].iter().any(|instruction| instruction.contains("Nature")));
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingRewrite_shouldFallBackToStyleBlock() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    let options = RunOptions {
        translate: false,
        style: Some(StyleConfig {
            preset: "ieee".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let result = common::bare_pipeline()
        .with_rewriter(Arc::new(FakeRewriter::new(RewriteAnswer::Error)))
        .start(&input, options)
        .finish()
        .await;

    assert!(result.is_success());
    assert!(result.text.contains("# --- IEEE academic style ---"));
    Ok(())
}

#[tokio::test]
async fn test_run_withAcceptedRewrite_shouldUseRewrittenText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;
    let rewritten = "import matplotlib.pyplot as plt\nfig, axes = plt.subplots(2, 2)\nplt.show()\n";

    let options = RunOptions {
        translate: false,
        beautify_layout: true,
        vector_format: Some(VectorFormat::Pdf),
        ..Default::default()
    };
    let result = common::bare_pipeline()
        .with_rewriter(Arc::new(FakeRewriter::new(RewriteAnswer::Code(rewritten.to_string()))))
        .start(&input, options)
        .finish()
        .await;

    assert!(result.is_success());
    assert_eq!(result.text, rewritten);
    assert!(
        !result
            .events
            .iter()
            .any(|event| event.stage == PipelineStage::SaveDirective)
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withVectorFormatAndNoRewriter_shouldInsertSaveBeforeShow() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    let options = RunOptions {
        translate: false,
        vector_format: Some(VectorFormat::Svg),
        ..Default::default()
    };
    let result = common::bare_pipeline().start(&input, options).finish().await;

    assert!(result.is_success());
    let lines: Vec<&str> = result.text.split('\n').collect();
    let show = lines
        .iter()
        .position(|line| *line == "plt.show()")
        .expect("display call kept");
    assert_eq!(
        lines[show - 1],
        "plt.savefig('sine_figure.svg', bbox_inches='tight', dpi=300)"
    );
    assert_eq!(result.text.matches("plt.savefig(").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withVectorFormatAndNoDisplayCall_shouldWarnAndSkipSave() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = "import matplotlib.pyplot as plt\nplt.plot([1, 2, 3])\n";
    let input = common::create_test_file(temp_dir.path(), "line.py", script)?;

    let options = RunOptions {
        translate: false,
        vector_format: Some(VectorFormat::Eps),
        ..Default::default()
    };
    let result = common::bare_pipeline().start(&input, options).finish().await;

    assert!(result.is_success());
    assert!(!result.text.contains("savefig"));
    assert!(
        result
            .warnings()
            .any(|event| event.stage == PipelineStage::SaveDirective)
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withBeautifyAndNoRewriter_shouldWarnLayoutUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;

    let options = RunOptions {
        translate: false,
        beautify_layout: true,
        ..Default::default()
    };
    let result = common::bare_pipeline().start(&input, options).finish().await;

    assert!(result.is_success());
    assert_eq!(result.text, common::with_font_block(SINE_SCRIPT, 1));
    assert_eq!(result.warnings().count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFailWithoutSuccessToken() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("missing.py");

    let events: Vec<ProgressEvent> = common::bare_pipeline()
        .start(&input, RunOptions::default())
        .into_stream()
        .collect()
        .await;

    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::Failed));
    assert!(events.iter().all(|e| !e.to_string().contains(SUCCESS_TOKEN)));
    assert!(!temp_dir.path().join("missing_zh_revision.py").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withSyntaxError_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "broken.py",
        "import matplotlib.pyplot as plt\nplt.title('Broken'\n",
    )?;
    let translator = Arc::new(FakeTranslator::with(&[("Broken", "损坏")]));

    let result = common::bare_pipeline()
        .with_translator(translator.clone())
        .start(&input, RunOptions::default())
        .finish()
        .await;

    assert!(!result.is_success());
    assert!(result.output_path.is_none());
    assert_eq!(translator.calls(), 0);
    assert!(!temp_dir.path().join("broken_zh_revision.py").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withIndentationError_shouldFailWithoutSuccessToken() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "indented.py",
        "import matplotlib.pyplot as plt\nx = 1\n    plt.title('Indented')\nplt.show()\n",
    )?;
    let translator = Arc::new(FakeTranslator::with(&[("Indented", "缩进")]));

    let events: Vec<ProgressEvent> = common::bare_pipeline()
        .with_translator(translator.clone())
        .start(&input, RunOptions::default())
        .into_stream()
        .collect()
        .await;

    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::Failed));
    assert!(events.iter().all(|e| !e.to_string().contains(SUCCESS_TOKEN)));
    assert_eq!(translator.calls(), 0);
    assert!(!temp_dir.path().join("indented_zh_revision.py").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withUnrequestedLongerTranslation_shouldMergeLongestFirst() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let script = "import numpy as np\n\
import matplotlib.pyplot as plt\n\
x = np.linspace(0, 10, 100)\n\
y = np.sin(x)\n\
plt.plot(x, y, 'b-', linewidth=2, label='Sine Wave')\n\
plt.title('Sample Sine Wave Plot')\n\
plt.legend()\n\
plt.show()\n";
    let input = common::create_test_file(temp_dir.path(), "sample.py", script)?;
    let translator = Arc::new(FakeTranslator::answering_all(&[
        ("Sample Sine Wave Plot", "示例正弦波图"),
        ("Sine Wave", "正弦波"),
    ]));

    let result = common::bare_pipeline()
        .with_translator(translator.clone())
        .start(&input, RunOptions::default())
        .finish()
        .await;

    assert!(result.is_success());
    assert!(result.text.contains("plt.title('示例正弦波图')"));
    assert!(result.text.contains("label='正弦波'"));
    assert!(!result.text.contains("Sample 正弦波 Plot"));
    Ok(())
}

#[tokio::test]
async fn test_stream_shouldEndWithSuccessTokenCarryingOutputPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "sine.py", SINE_SCRIPT)?;
    let output_dir = temp_dir.path().join("out");

    let options = RunOptions {
        translate: false,
        output_dir: Some(output_dir.clone()),
        ..Default::default()
    };
    let events: Vec<ProgressEvent> = common::bare_pipeline()
        .start(&input, options)
        .into_stream()
        .collect()
        .await;

    let last = events.last().expect("at least one event");
    let expected = output_dir.join("sine_zh_revision.py");
    assert_eq!(last.to_string(), format!("{}{}", SUCCESS_TOKEN, expected.display()));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(expected.exists());
    Ok(())
}
