//! # Pagelingo Library
//!
//! 翻译 HTML 页面与 JavaScript/TypeScript 源码中用户可见的文本，
//! 同时保持标签结构、选择器、键名、URL 和代码不变。
//!
//! ## 模块组织
//!
//! - `core` - 文档分发器，按文档类型串联完整的处理管道
//! - `parsers` - 标记文档与脚本的解析、遍历和序列化
//! - `translation` - 文本分类、去重收集、翻译网关、配置与错误
//! - `archive` - zip 压缩包与目录树的批量处理
//! - `utils` - 二进制探测、垃圾路径判断和日志初始化
//! - `env` - 类型安全的环境变量
//! - `web` - HTTP 接口（可选）

pub mod archive;
pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used items for convenience
pub use crate::core::{
    DispatchOutcome, Dispatcher, DispatcherOptions, DocumentKind, DocumentRequest,
    PassthroughReason,
};
pub use crate::translation::{TranslationError, TranslationResult};
