use super::tokens::MarkupTree;
use crate::parsers::splice::{splice_edits, SpliceEdit};
use crate::translation::error::TranslationResult;

/// 转义文本内容
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 转义属性值
///
/// 原值没有引号时，如果新值不能安全地不加引号出现，则补上双引号。
pub fn escape_attr(value: &str, quote: Option<char>) -> String {
    let needs_quotes = quote.is_none()
        && (value.is_empty()
            || value.chars().any(|c| {
                c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
            }));
    let quote = match quote {
        Some(quote) => Some(quote),
        None if needs_quotes => Some('"'),
        None => None,
    };

    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            '"' if quote == Some('"') => escaped.push_str("&quot;"),
            '\'' if quote == Some('\'') => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    if needs_quotes {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

/// 在 html 与 body 开始标签上补充 dir="rtl" 的插入操作
///
/// 只对完整文档生效，已有 dir 属性或源码中不存在的标签保持不变。
pub fn rtl_direction_edits(tree: &MarkupTree) -> Vec<SpliceEdit> {
    if !tree.is_document() {
        return Vec::new();
    }

    ["html", "body"]
        .into_iter()
        .filter_map(|name| tree.first_start_tag(name))
        .filter(|tag| tag.attr("dir").is_none())
        .map(|tag| SpliceEdit {
            start: tag.name_end,
            end: tag.name_end,
            replacement: " dir=\"rtl\"".to_string(),
        })
        .collect()
}

/// 把叶子替换写回源码，未触及的部分逐字节保留
pub fn serialize_markup(tree: &MarkupTree, edits: Vec<SpliceEdit>) -> TranslationResult<String> {
    splice_edits(tree.source(), edits)
}
