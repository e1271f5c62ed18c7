//! 文本收集器模块
//!
//! 把遍历器找到的叶子值整理成去重后的有序批次。相同的规范化文本只翻译一次，
//! 每个提取项只记录它在批次中的下标。

use std::collections::HashMap;

use super::filters::normalize_whitespace;
use super::rules::CompiledRules;

/// 去重后的待翻译文本，顺序为首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    texts: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入文本并返回下标；已存在时返回原下标
    pub fn insert(&mut self, text: String) -> usize {
        if let Some(&index) = self.positions.get(&text) {
            return index;
        }

        let index = self.texts.len();
        self.positions.insert(text.clone(), index);
        self.texts.push(text);
        index
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// 总字符数
    pub fn char_count(&self) -> usize {
        self.texts.iter().map(|t| t.chars().count()).sum()
    }
}

/// 一个被提取的叶子值
#[derive(Debug, Clone)]
pub struct ExtractedItem<H> {
    /// 指向原始节点的补丁句柄
    pub handle: H,
    /// 提取时的原始值，包含首尾空白
    pub original: String,
    /// 批次下标
    pub batch_index: usize,
}

impl<H> ExtractedItem<H> {
    /// 原始值的规范化形式（未经过替换规则）
    pub fn normalized(&self) -> String {
        normalize_whitespace(&self.original)
    }
}

/// 收集统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub extracted: usize,
    pub unique: usize,
    pub skipped: usize,
}

/// 文本收集器
#[derive(Debug)]
pub struct TextCollector<H> {
    batch: Batch,
    items: Vec<ExtractedItem<H>>,
    rules: CompiledRules,
    skipped: usize,
}

impl<H> Default for TextCollector<H> {
    fn default() -> Self {
        Self::new(CompiledRules::default())
    }
}

impl<H> TextCollector<H> {
    /// 创建新的收集器，替换规则在文本进入批次前执行
    pub fn new(rules: CompiledRules) -> Self {
        Self {
            batch: Batch::new(),
            items: Vec::new(),
            rules,
            skipped: 0,
        }
    }

    /// 记录一个已判定为可翻译的值
    pub fn push(&mut self, handle: H, original: &str) -> usize {
        let normalized = normalize_whitespace(original);
        let text = if self.rules.is_empty() {
            normalized
        } else {
            self.rules.apply(&normalized)
        };

        let batch_index = self.batch.insert(text);
        self.items.push(ExtractedItem {
            handle,
            original: original.to_string(),
            batch_index,
        });
        batch_index
    }

    /// 记录一个被判定为不透明的值
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn items(&self) -> &[ExtractedItem<H>] {
        &self.items
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            extracted: self.items.len(),
            unique: self.batch.len(),
            skipped: self.skipped,
        }
    }

    /// 结束收集
    pub fn finish(self) -> (Batch, Vec<ExtractedItem<H>>) {
        (self.batch, self.items)
    }
}
