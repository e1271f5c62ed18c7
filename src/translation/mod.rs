//! 翻译模块
//!
//! 采用清晰的模块化架构：
//! - **core**: 翻译网关接口与实现
//! - **pipeline**: 文本处理管道（分类、收集、替换、回写）
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pagelingo::core::{Dispatcher, DispatcherOptions, DocumentKind, DocumentRequest};
//! use pagelingo::translation::{load_translation_config, OpenAiGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_translation_config();
//! let gateway = Arc::new(OpenAiGateway::from_config(&config)?);
//! let dispatcher = Dispatcher::new(gateway, DispatcherOptions::from_config(&config));
//!
//! let request = DocumentRequest::new("<p>Hello world</p>", DocumentKind::Markup, "fr");
//! let outcome = dispatcher.dispatch(request).await?;
//! println!("{}", outcome.text());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 处理翻译相关的所有配置
///
/// 提供API配置、分类名单、配置文件与环境变量加载
pub mod config;

/// 核心翻译模块 - 翻译网关
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 文本处理管道模块 - 分类、去重收集、替换规则与回写
pub mod pipeline;

// ============================================================================
// 公共API重新导出
// ============================================================================

pub use self::config::{load_translation_config, ConfigManager, TranslationConfig};
pub use self::core::{translate_batch, MockGateway, MockReply, OpenAiGateway, TranslationGateway};
pub use error::{TranslationError, TranslationResult};
pub use pipeline::{
    Batch, ClassifierConfig, SubstitutionRules, TextClassifier, TextCollector, TextContext,
};
