//! 翻译系统核心模块
//!
//! 负责与外部翻译服务交互：
//!
//! - **网关接口** (`gateway.rs`): `TranslationGateway` 特性、结果对齐与失败回退
//! - **OpenAI 网关** (`openai.rs`): 基于 chat completions 的实现
//!
//! ## 模块依赖关系
//!
//! ```text
//! Dispatcher (crate::core)
//!     └── translate_batch (gateway.rs)
//!             └── TranslationGateway
//!                     ├── OpenAiGateway (openai.rs)
//!                     └── MockGateway (gateway.rs)
//! ```

pub mod gateway;
pub mod openai;

pub use gateway::{reconcile, translate_batch, MockGateway, MockReply, TranslationGateway};
pub use openai::OpenAiGateway;
