//! # 解析器模块
//!
//! 这个模块包含两类文档的解析、遍历与源码拼接：
//!
//! - `html` - 标记分词、源码区间定位、遍历和 RTL 后处理
//! - `js` - 脚本语法树解析和字面量提取
//! - `splice` - 两类文档共用的源码拼接

pub mod html;
pub mod js;
pub mod splice;

pub use html::{parse_markup, rtl_direction_edits, serialize_markup, MarkupTree, MarkupWalker};
pub use js::{parse_script, ScriptDialect, ScriptTree, ScriptWalker};
pub use splice::{splice_edits, SpliceEdit};
