//! 文本过滤器模块
//!
//! 判断一个叶子值是可翻译的界面文本，还是代码、路径、选择器、键名等不透明内容。
//!
//! 优先级（同一上下文内固定不变）：
//! 1. 结构性上下文（导入路径、键名、选择器槽位等）一律不透明
//! 2. 去空白后为空、或形如代码/路径的值不透明（所有上下文）
//! 3. 标记文本与标记属性到此为止，其余均可翻译
//! 4. 脚本文案位置（白名单属性/键名、JSX 文本、选择器配对的第二项）额外排除
//!    选择器、统计前缀和多段 slug，但不排除单个单词，所以按钮文字 "Save" 会被翻译
//! 5. 普通脚本字符串排除全部键名形态，包括单个标识符

use std::sync::OnceLock;

use regex::Regex;

use crate::translation::config::constants;

/// 叶子值所在的语法上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextContext {
    /// 标记文档中的文本节点
    MarkupText,
    /// 标记文档中白名单属性的值
    MarkupAttribute,
    /// 没有更具体位置信息的脚本字符串
    ScriptLiteral,
    /// 已知承载界面文案的脚本位置
    ScriptProse,
    /// import/export 的模块路径
    ImportSource,
    /// require()/import() 的参数
    ModuleLoad,
    /// 对象键名或下标访问的键
    PropertyKey,
    /// 结构性 API 调用的参数
    StructuralArgument,
    /// 选择器配对数组的第一项
    SelectorSlot,
    /// TypeScript 字面量类型
    TypeAnnotation,
    /// 相等比较或 case 标签的操作数
    Comparison,
    /// "use strict" 之类的指令
    Directive,
}

impl TextContext {
    /// 上下文本身就决定了不透明
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TextContext::ImportSource
                | TextContext::ModuleLoad
                | TextContext::PropertyKey
                | TextContext::StructuralArgument
                | TextContext::SelectorSlot
                | TextContext::TypeAnnotation
                | TextContext::Comparison
                | TextContext::Directive
        )
    }
}

/// 不透明的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpaqueReason {
    Empty,
    CodeOrPath,
    Selector,
    MachineKey,
    Structural(TextContext),
}

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Translatable,
    Opaque(OpaqueReason),
}

impl Classification {
    pub fn is_translatable(&self) -> bool {
        matches!(self, Classification::Translatable)
    }
}

/// 分类器配置
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// 含有代码符号时，短于该长度的字符串视为代码
    pub code_length_threshold: usize,
    /// 事件名（不区分大小写）
    pub event_names: Vec<String>,
    /// 统计/埋点键名前缀（不区分大小写）
    pub analytics_prefixes: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            code_length_threshold: constants::CODE_LENGTH_THRESHOLD,
            event_names: constants::EVENT_NAMES.iter().map(|s| s.to_string()).collect(),
            analytics_prefixes: constants::ANALYTICS_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 文本分类器
#[derive(Debug, Clone, Default)]
pub struct TextClassifier {
    config: ClassifierConfig,
}

impl TextClassifier {
    /// 创建新的文本分类器
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// 获取配置
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// 对原始值分类，结果只取决于值和上下文
    pub fn classify(&self, raw: &str, context: TextContext) -> Classification {
        if context.is_structural() {
            return Classification::Opaque(OpaqueReason::Structural(context));
        }

        let text = normalize_whitespace(raw);
        if text.is_empty() {
            return Classification::Opaque(OpaqueReason::Empty);
        }

        if self.looks_like_code_or_path(&text) {
            return Classification::Opaque(OpaqueReason::CodeOrPath);
        }

        match context {
            TextContext::MarkupText | TextContext::MarkupAttribute => Classification::Translatable,
            TextContext::ScriptProse => {
                if is_selector_like(&text) {
                    Classification::Opaque(OpaqueReason::Selector)
                } else if self.has_analytics_prefix(&text) || is_multi_segment_slug(&text) {
                    Classification::Opaque(OpaqueReason::MachineKey)
                } else {
                    Classification::Translatable
                }
            }
            _ => {
                if is_selector_like(&text) {
                    Classification::Opaque(OpaqueReason::Selector)
                } else if self.is_key_like(&text) {
                    Classification::Opaque(OpaqueReason::MachineKey)
                } else {
                    Classification::Translatable
                }
            }
        }
    }

    /// 便捷方法
    pub fn is_translatable(&self, raw: &str, context: TextContext) -> bool {
        self.classify(raw, context).is_translatable()
    }

    /// URL、路径、锚点，或短小且含代码符号的字符串
    pub fn looks_like_code_or_path(&self, text: &str) -> bool {
        let t = text.trim();
        if t.is_empty() {
            return true;
        }

        if path_prefix_regex().is_match(t) {
            return true;
        }

        t.chars().count() < self.config.code_length_threshold
            && t.chars().any(|c| matches!(c, '{' | '}' | '[' | ']' | ';' | '=' | '<' | '>'))
    }

    /// 事件名、统计前缀或标识符/slug 形态
    pub fn is_key_like(&self, text: &str) -> bool {
        let t = text.trim();

        if self.config.event_names.iter().any(|e| e.eq_ignore_ascii_case(t)) {
            return true;
        }

        if self.has_analytics_prefix(t) {
            return true;
        }

        bare_token_regex().is_match(t) || identifier_regex().is_match(t) || is_multi_segment_slug(t)
    }

    fn has_analytics_prefix(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.config
            .analytics_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
    }
}

/// 折叠内部空白并去掉首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 类/ID/属性选择器开头、含组合符或伪类
pub fn is_selector_like(text: &str) -> bool {
    let t = text.trim();
    if t.starts_with(['.', '#', '[']) {
        return true;
    }

    if t.contains(['>', '~', '+']) {
        return true;
    }

    pseudo_class_regex().is_match(t)
}

// kebab-case 或 snake_case，至少两段
fn is_multi_segment_slug(text: &str) -> bool {
    kebab_regex().is_match(text) || snake_regex().is_match(text)
}

fn path_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(https?://|mailto:|tel:|/|\.{1,2}/|#)").unwrap())
}

fn pseudo_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i):{1,2}[a-z-]+").unwrap())
}

fn bare_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap())
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

fn kebab_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+(-[A-Za-z0-9]+)+$").unwrap())
}

fn snake_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+(_[A-Za-z0-9]+)+$").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_classifier() -> TextClassifier {
        TextClassifier::default()
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Hello \n\t World  "), "Hello World");
        assert_eq!(normalize_whitespace("   "), "");
        assert_eq!(normalize_whitespace("a  b   c"), "a b c");
    }

    #[test]
    fn test_empty_is_opaque_everywhere() {
        let classifier = create_test_classifier();
        for context in [
            TextContext::MarkupText,
            TextContext::MarkupAttribute,
            TextContext::ScriptLiteral,
            TextContext::ScriptProse,
        ] {
            assert_eq!(
                classifier.classify(" \n ", context),
                Classification::Opaque(OpaqueReason::Empty),
                "Whitespace-only text should be opaque in {:?}",
                context
            );
        }
    }

    #[test]
    fn test_paths_and_urls_are_opaque() {
        let classifier = create_test_classifier();
        for value in [
            "/api/users",
            "./img/logo.png",
            "../shared",
            "https://example.com",
            "HTTP://EXAMPLE.COM",
            "mailto:team@example.com",
            "tel:+123456",
            "#top",
        ] {
            assert_eq!(
                classifier.classify(value, TextContext::MarkupText),
                Classification::Opaque(OpaqueReason::CodeOrPath),
                "{} should be treated as a path",
                value
            );
        }
    }

    #[test]
    fn test_code_symbols_depend_on_length() {
        let classifier = create_test_classifier();
        assert!(!classifier.is_translatable("a = b;", TextContext::MarkupText));
        assert!(!classifier.is_translatable("{count} items", TextContext::MarkupText));

        let long = "Use the settings page to change your preferences; your changes are saved right away.";
        assert!(long.len() >= 80);
        assert!(classifier.is_translatable(long, TextContext::MarkupText));
    }

    #[test]
    fn test_selectors_are_opaque_in_script() {
        let classifier = create_test_classifier();
        for value in [".btn-primary", "#save-btn", "[data-id]", "ul > li", "a:hover", "p::before"] {
            assert!(
                !classifier.is_translatable(value, TextContext::ScriptLiteral),
                "{} should be a selector",
                value
            );
        }
    }

    #[test]
    fn test_machine_keys_are_opaque_in_script() {
        let classifier = create_test_classifier();
        for value in ["click", "Submit", "DOMContentLoaded", "utm_source", "dataLayer", "gtm_id", "user_id", "main-content", "Save"] {
            assert!(
                !classifier.is_translatable(value, TextContext::ScriptLiteral),
                "{} should be key-like",
                value
            );
        }
        assert!(classifier.is_translatable("Save changes", TextContext::ScriptLiteral));
    }

    #[test]
    fn test_prose_context_keeps_single_words() {
        let classifier = create_test_classifier();
        assert!(classifier.is_translatable("Save", TextContext::ScriptProse));
        assert!(classifier.is_translatable("Welcome back!", TextContext::ScriptProse));

        assert!(!classifier.is_translatable("not-a-button-id", TextContext::ScriptProse));
        assert!(!classifier.is_translatable("utm_campaign", TextContext::ScriptProse));
        assert!(!classifier.is_translatable(".hidden", TextContext::ScriptProse));
    }

    #[test]
    fn test_markup_text_allows_short_words() {
        let classifier = create_test_classifier();
        assert!(classifier.is_translatable("Save", TextContext::MarkupText));
        assert!(classifier.is_translatable("click", TextContext::MarkupAttribute));
    }

    #[test]
    fn test_structural_contexts_always_opaque() {
        let classifier = create_test_classifier();
        let prose = "Hello there, friend";
        for context in [
            TextContext::ImportSource,
            TextContext::ModuleLoad,
            TextContext::PropertyKey,
            TextContext::StructuralArgument,
            TextContext::SelectorSlot,
            TextContext::TypeAnnotation,
            TextContext::Comparison,
            TextContext::Directive,
        ] {
            assert_eq!(
                classifier.classify(prose, context),
                Classification::Opaque(OpaqueReason::Structural(context))
            );
        }
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = create_test_classifier();
        let inputs = ["Hello world", "click", "/x", "Save", ".a"];
        let first: Vec<_> = inputs
            .iter()
            .map(|s| classifier.classify(s, TextContext::ScriptLiteral))
            .collect();
        let second: Vec<_> = inputs
            .iter()
            .rev()
            .map(|s| classifier.classify(s, TextContext::ScriptLiteral))
            .rev()
            .collect();
        assert_eq!(first, second, "Order of calls must not change results");
    }

    #[test]
    fn test_custom_config_is_used() {
        let classifier = TextClassifier::new(ClassifierConfig {
            code_length_threshold: 5,
            event_names: vec!["tap".to_string()],
            analytics_prefixes: vec![],
        });
        assert!(!classifier.is_translatable("tap", TextContext::ScriptLiteral));
        assert!(classifier.is_translatable("x = 1 + something", TextContext::MarkupText));
        assert_eq!(classifier.config().code_length_threshold, 5);
    }
}
