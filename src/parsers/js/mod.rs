//! 脚本解析和处理模块
//!
//! - `syntax`: tree-sitter 解析与语法能力检查
//! - `literal`: 字面量解码与按原引号风格重新编码
//! - `walker`: 按位置规则提取可翻译字面量

pub mod literal;
pub mod syntax;
pub mod walker;

pub use literal::LiteralKind;
pub use syntax::{is_available, parse_script, ScriptDialect, ScriptTree};
pub use walker::{LiteralSite, LiteralSlot, ScriptSites, ScriptWalker, ScriptWalkerConfig};
