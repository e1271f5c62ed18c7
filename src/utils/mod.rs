//! # 工具模块
//!
//! 这个模块包含解析之前的输入检查和进程级工具：
//!
//! - 二进制/乱码内容探测
//! - 资源分叉与元数据路径识别
//! - 日志初始化
//!
//! # 模块组织
//!
//! - `sniff` - 文本探测与垃圾路径判断
//! - `logging` - tracing 订阅者

pub mod logging;
pub mod sniff;

// Re-export commonly used items for convenience
pub use logging::init_tracing;
pub use sniff::{is_binary, is_binary_with, is_junk_path};
