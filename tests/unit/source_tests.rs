/*!
 * Tests for extraction, merging and the injectors through the public API
 */

use std::str::FromStr;

use academicplot::errors::ParseError;
use academicplot::source::{
    FontSupportInjector, InjectionOutcome, PlotRules, SaveDirectiveInjector, SourceDocument,
    StructuralExtractor, TextMerger, VectorFormat,
};

use crate::common::{self, SINE_SCRIPT};

#[test]
fn test_extractThenMerge_withFullTranslation_shouldRewriteEveryLabel() {
    let rules = PlotRules::matplotlib();
    let document = SourceDocument::parse(SINE_SCRIPT).unwrap();
    let candidates = StructuralExtractor::new(&rules).extract(&document);

    let keys: Vec<&str> = candidates.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Amplitude", "Generate data", "Sine", "Sine wave", "Time (s)"]);

    let translations = common::translation_map(&[
        ("Amplitude", "振幅"),
        ("Generate data", "生成数据"),
        ("Sine", "正弦"),
        ("Sine wave", "正弦波"),
        ("Time (s)", "时间 (s)"),
    ]);
    let merged = TextMerger::apply(SINE_SCRIPT, &candidates, &translations);

    assert!(merged.contains("# 生成数据"));
    assert!(merged.contains("plt.title('正弦波')"));
    assert!(merged.contains("plt.xlabel('时间 (s)')"));
    assert!(merged.contains("plt.ylabel(\"振幅\")"));
    assert!(merged.contains("plt.text(5, 0.5, '正弦')"));
    assert!(!merged.contains("正弦 wave"));
}

#[test]
fn test_merge_withNestedLiteral_shouldAvoidPartialSubstitution() {
    let text = "plt.title('Sample Sine Wave Plot')\nplt.plot(x, y, label='Sine Wave')\n";
    let rules = PlotRules::matplotlib();
    let doc = SourceDocument::parse(text).unwrap();
    // `plot` is not a labeling call, so only the title is a candidate
    let candidates = StructuralExtractor::new(&rules).extract(&doc);
    assert_eq!(candidates.len(), 1);
    let translations = common::translation_map(&[
        ("Sample Sine Wave Plot", "示例正弦波图"),
        ("Sine Wave", "正弦波"),
    ]);

    let merged = TextMerger::apply(text, &candidates, &translations);

    assert_eq!(merged, "plt.title('示例正弦波图')\nplt.plot(x, y, label='正弦波')\n");
}

#[test]
fn test_parse_withUnbalancedParenthesis_shouldReturnSyntaxError() {
    let result = SourceDocument::parse("import matplotlib.pyplot as plt\nplt.title('x'\n");
    assert!(matches!(result, Err(ParseError::Syntax { .. })));
}

#[test]
fn test_fontSupport_onScriptWithExistingConfig_shouldNotDuplicate() {
    let rules = PlotRules::matplotlib();
    let source = "import matplotlib.pyplot as plt\nplt.rcParams['font.sans-serif'] = ['Noto Sans CJK SC']\n";

    let injection = FontSupportInjector::new(&rules).inject(source);

    assert_eq!(injection.outcome, InjectionOutcome::AlreadyPresent);
    assert_eq!(injection.text, source);
}

#[test]
fn test_fontSupport_injectedTwice_shouldMatchSingleInjection() {
    let rules = PlotRules::matplotlib();
    let injector = FontSupportInjector::new(&rules);

    let once = injector.inject(SINE_SCRIPT).text;
    let twice = injector.inject(&once).text;

    assert_eq!(once, twice);
    assert_eq!(once, common::with_font_block(SINE_SCRIPT, 1));
}

#[test]
fn test_fontSupport_withImportInsideFunction_shouldStillParse() {
    let rules = PlotRules::matplotlib();
    let source = "def main():\n    import matplotlib.pyplot as plt\n    plt.plot([1])\n\nmain()\n";

    let injection = FontSupportInjector::new(&rules).inject(source);

    assert!(matches!(injection.outcome, InjectionOutcome::Inserted(_)));
    assert!(injection.text.contains("\n    plt.rcParams['font.sans-serif'] = ['SimHei']\n"));
    assert!(SourceDocument::parse(injection.text).is_ok());
}

#[test]
fn test_saveDirective_shouldNameFigureAndResolution() {
    let rules = PlotRules::matplotlib();
    let directive = SaveDirectiveInjector::new(&rules).directive("sine_figure.pdf", 600);
    assert_eq!(directive, "plt.savefig('sine_figure.pdf', bbox_inches='tight', dpi=600)");
}

#[test]
fn test_vectorFormat_fromStr_shouldAcceptDotsAndCase() {
    assert_eq!(VectorFormat::from_str(".PDF").unwrap(), VectorFormat::Pdf);
    assert_eq!(VectorFormat::from_str("svg").unwrap(), VectorFormat::Svg);
    assert_eq!(VectorFormat::from_str(" eps ").unwrap(), VectorFormat::Eps);
    assert!(VectorFormat::from_str("png").is_err());
    assert_eq!(VectorFormat::all().map(|f| f.to_string()), ["pdf", "svg", "eps"]);
}
