//! 日志初始化

use tracing_subscriber::EnvFilter;

use crate::env::{core::LogLevel, EnvVar};

/// 安装全局 tracing 订阅者
///
/// 过滤规则来自 `PAGELINGO_LOG_LEVEL`，取值无效时使用 `info`。
/// 重复调用是安全的，只有第一次生效。
pub fn init_tracing() {
    let level = LogLevel::get().unwrap_or_else(|e| {
        eprintln!("{}", e);
        "info".to_string()
    });

    let filter = EnvFilter::try_new(&level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
