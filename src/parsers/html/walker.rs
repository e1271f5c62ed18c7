//! 标记遍历器模块
//!
//! 按文档顺序遍历令牌，收集可翻译的文本段和白名单属性值。
//!
//! # 规则
//!
//! - 文本段：规范化后非空、不像代码或路径，且不在不可见元素
//!   （script/style/noscript/code/pre）内部时提取
//! - 开始标签：检查白名单属性（placeholder/title/aria-label/alt/value），
//!   每个存在且不透明检查通过的值单独提取
//! - 不可见元素的整个内容都会被跳过，包括其中元素的属性
//! - 原始文本元素（title 除外）的内容不能转义写回，从不提取
//! - 注释和 doctype 从不提取

use std::ops::Range;

use super::serializer::{escape_attr, escape_text};
use super::tokens::{MarkupToken, MarkupTree, TagSpan};
use crate::translation::config::constants;
use crate::translation::pipeline::{TextClassifier, TextCollector, TextContext};

/// 没有内容的元素，开始标签不会打开作用域
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// 标记遍历器配置
#[derive(Debug, Clone)]
pub struct MarkupWalkerConfig {
    /// 内部不提取任何内容的元素
    pub skip_elements: Vec<String>,
    /// 会被提取的属性名
    pub translatable_attrs: Vec<String>,
}

impl Default for MarkupWalkerConfig {
    fn default() -> Self {
        Self {
            skip_elements: constants::SKIP_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            translatable_attrs: constants::TRANSLATABLE_ATTRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// 叶子值的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Text,
    Attribute { quote: Option<char> },
}

/// 指向源码中一个叶子值的补丁句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSlot {
    pub span: Range<usize>,
    pub kind: SlotKind,
}

impl MarkupSlot {
    /// 把新值编码成可以直接替换 `span` 的源码
    pub fn render(&self, value: &str) -> String {
        match self.kind {
            SlotKind::Text => escape_text(value),
            SlotKind::Attribute { quote } => escape_attr(value, quote),
        }
    }
}

/// 标记遍历器
pub struct MarkupWalker<'a> {
    config: &'a MarkupWalkerConfig,
    classifier: &'a TextClassifier,
}

impl<'a> MarkupWalker<'a> {
    pub fn new(config: &'a MarkupWalkerConfig, classifier: &'a TextClassifier) -> Self {
        Self { config, classifier }
    }

    /// 遍历整个标记树
    pub fn walk(&self, tree: &MarkupTree, collector: &mut TextCollector<MarkupSlot>) {
        // 已打开的不可见元素
        let mut hidden: Vec<&str> = Vec::new();

        for token in tree.tokens() {
            match token {
                MarkupToken::Text {
                    span,
                    value,
                    escapable,
                } => {
                    if !hidden.is_empty() || !escapable {
                        continue;
                    }
                    if self.classifier.is_translatable(value, TextContext::MarkupText) {
                        let slot = MarkupSlot {
                            span: span.clone(),
                            kind: SlotKind::Text,
                        };
                        collector.push(slot, value);
                    } else {
                        collector.skip();
                    }
                }
                MarkupToken::StartTag(tag) => {
                    if self.is_skipped_element(&tag.name) {
                        if !tag.self_closing && !VOID_ELEMENTS.contains(&tag.name.as_str()) {
                            hidden.push(&tag.name);
                        }
                        continue;
                    }
                    if hidden.is_empty() {
                        self.visit_attributes(tag, collector);
                    }
                }
                MarkupToken::EndTag { name, .. } => {
                    if let Some(open) = hidden.iter().rposition(|open| *open == name.as_str()) {
                        hidden.truncate(open);
                    }
                }
                MarkupToken::Comment { .. } | MarkupToken::Doctype { .. } => {}
            }
        }
    }

    fn visit_attributes(&self, tag: &TagSpan, collector: &mut TextCollector<MarkupSlot>) {
        for attr_name in &self.config.translatable_attrs {
            let Some(attr) = tag.attr(attr_name) else {
                continue;
            };
            let Some(span) = &attr.value_span else {
                continue;
            };

            if self.classifier.is_translatable(&attr.value, TextContext::MarkupAttribute) {
                let slot = MarkupSlot {
                    span: span.clone(),
                    kind: SlotKind::Attribute { quote: attr.quote },
                };
                collector.push(slot, &attr.value);
            } else {
                collector.skip();
            }
        }
    }

    fn is_skipped_element(&self, name: &str) -> bool {
        self.config
            .skip_elements
            .iter()
            .any(|skip| skip.eq_ignore_ascii_case(name))
    }
}
