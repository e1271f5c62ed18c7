//! API 处理器

pub mod translation;

pub use translation::*;
