//! 输入探测
//!
//! 在任何解析之前拒绝非文本内容。误判为二进制只会跳过翻译，
//! 漏判则可能让下游解析器处理垃圾输入。

use crate::translation::config::constants;

/// 判断文本是否像二进制或解码失败的内容（严格模式）
pub fn is_binary(text: &str) -> bool {
    is_binary_with(text, true)
}

/// 判断文本是否像二进制内容
///
/// 依次检查，命中即返回：
/// 1. 含有 NUL 字符
/// 2. 前 2048 个字符中含有制表符、换行、回车以外的控制字符
/// 3. 前 2048 个字符中含有至少 5 个 U+FFFD
/// 4. 严格模式下，前 2048 个字符中不可打印字符超过 2%
pub fn is_binary_with(text: &str, strict: bool) -> bool {
    if text.contains('\0') {
        return true;
    }

    let head: Vec<char> = text.chars().take(constants::SNIFF_WINDOW_CHARS).collect();

    if head.iter().any(|&c| is_disallowed_control(c)) {
        return true;
    }

    let replacements = head.iter().filter(|&&c| c == '\u{FFFD}').count();
    if replacements >= constants::MAX_REPLACEMENT_CHARS {
        return true;
    }

    if strict && !head.is_empty() {
        let bad = head.iter().filter(|&&c| !is_printable(c)).count();
        if bad as f64 / head.len() as f64 > constants::STRICT_BAD_CHAR_RATIO {
            return true;
        }
    }

    false
}

/// 判断压缩包成员路径是否属于资源分叉或元数据产物
///
/// 反斜杠按正斜杠处理；位于 `__MACOSX/` 下或任一路径段以 `._` 开头即视为垃圾路径。
pub fn is_junk_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }

    let normalized = path.replace('\\', "/");
    let junk_dir = format!("{}/", constants::JUNK_DIRECTORY);

    if normalized.starts_with(&junk_dir) || normalized.contains(&format!("/{}", junk_dir)) {
        return true;
    }

    normalized
        .split('/')
        .any(|segment| segment.starts_with(constants::JUNK_SEGMENT_PREFIX))
}

// U+0001..U+0008, U+000B, U+000C, U+000E..U+001F
fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{01}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}

fn is_printable(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' '..='~') || c >= '\u{A0}'
}
