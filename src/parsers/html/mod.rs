//! 标记文档解析和处理模块
//!
//! - `tokens`: 分词与源码区间定位
//! - `walker`: 按文档顺序遍历，收集可翻译文本和属性
//! - `serializer`: 转义、RTL 插入与源码拼接

pub mod serializer;
pub mod tokens;
pub mod walker;

pub use serializer::{escape_attr, escape_text, rtl_direction_edits, serialize_markup};
pub use tokens::{is_full_document, parse_markup, AttrSpan, MarkupToken, MarkupTree, TagSpan};
pub use walker::{MarkupSlot, MarkupWalker, MarkupWalkerConfig, SlotKind};
