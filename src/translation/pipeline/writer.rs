//! 回写模块
//!
//! 把翻译结果写回每个提取项。新值为 原始前导空白 + 译文 + 原始尾随空白。

use super::collector::ExtractedItem;

/// 回写统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub written: usize,
    pub unchanged: usize,
}

/// 把原始值拆成 前导空白 / 核心 / 尾随空白
pub fn split_whitespace_boundary(raw: &str) -> (&str, &str, &str) {
    let without_leading = raw.trim_start();
    let leading = &raw[..raw.len() - without_leading.len()];
    let core = without_leading.trim_end();
    let trailing = &without_leading[core.len()..];
    (leading, core, trailing)
}

/// 保留原始首尾空白，替换核心内容
pub fn compose(raw: &str, translated_core: &str) -> String {
    let (leading, _, trailing) = split_whitespace_boundary(raw);
    format!("{}{}{}", leading, translated_core, trailing)
}

/// 按批次下标写回翻译结果
///
/// 下标越界时保留原值。译文与原始规范化文本相同时不写，原节点保持逐字节不变。
pub fn reinsert<H, F>(items: &[ExtractedItem<H>], translations: &[String], mut apply: F) -> WriteStats
where
    F: FnMut(&H, &str),
{
    let mut stats = WriteStats::default();

    for item in items {
        let Some(translated) = translations.get(item.batch_index) else {
            stats.unchanged += 1;
            continue;
        };

        if *translated == item.normalized() {
            stats.unchanged += 1;
            continue;
        }

        apply(&item.handle, &compose(&item.original, translated));
        stats.written += 1;
    }

    stats
}
