//! 翻译管道模块
//!
//! 提供文本处理管道，包括分类、替换规则、去重收集和回写

pub mod collector;
pub mod filters;
pub mod rules;
pub mod writer;

// 重新导出主要类型
pub use collector::{Batch, CollectionStats, ExtractedItem, TextCollector};
pub use filters::{
    normalize_whitespace, Classification, ClassifierConfig, OpaqueReason, TextClassifier,
    TextContext,
};
pub use rules::{CompiledRules, RuleSpec, SubstitutionRules};
pub use writer::{compose, reinsert, split_whitespace_boundary, WriteStats};
