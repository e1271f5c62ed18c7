//! 源码拼接：把替换后的叶子值写回原始源码
//!
//! 标记文档和脚本共用。只有被替换的字节区间发生变化，其余源码逐字节保留。

use crate::translation::error::{TranslationError, TranslationResult};

/// 一次源码替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

/// 按字节区间应用替换
///
/// 区间重叠、越界或不在字符边界上时返回序列化错误。
pub fn splice_edits(source: &str, mut edits: Vec<SpliceEdit>) -> TranslationResult<String> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    edits.sort_by_key(|edit| edit.start);

    let mut output = String::with_capacity(source.len() + source.len() / 4);
    let mut cursor = 0;

    for edit in &edits {
        if edit.start < cursor || edit.end < edit.start {
            return Err(TranslationError::SerializationError(format!(
                "替换区间重叠: {}..{}",
                edit.start, edit.end
            )));
        }

        let kept = source.get(cursor..edit.start).ok_or_else(|| {
            TranslationError::SerializationError(format!("无效的替换区间: {}..{}", edit.start, edit.end))
        })?;
        if !source.is_char_boundary(edit.end) {
            return Err(TranslationError::SerializationError(format!(
                "无效的替换区间: {}..{}",
                edit.start, edit.end
            )));
        }

        output.push_str(kept);
        output.push_str(&edit.replacement);
        cursor = edit.end;
    }

    output.push_str(&source[cursor..]);
    Ok(output)
}
