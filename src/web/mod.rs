//! Web 服务器模块
//!
//! 以 HTTP 接口提供标记文档与脚本翻译服务

pub mod config;
pub mod handlers;
pub mod routes;
pub mod types;

pub use self::config::*;
pub use handlers::*;
pub use routes::*;
pub use types::*;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::translation::error::{TranslationError, TranslationResult};

/// Web 服务器
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 创建新的 Web 服务器
    pub fn new(config: WebConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// 启动 Web 服务器
    pub async fn start(&self) -> TranslationResult<()> {
        self.config
            .validate()
            .map_err(|e| TranslationError::ConfigError(e.to_string()))?;

        if self.state.dispatcher.is_none() {
            tracing::warn!("未配置 OPENAI_API_KEY，翻译接口将返回 500");
        }

        let app = create_router(Arc::new(self.state.clone()));
        let address = self.config.listen_address();

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| TranslationError::ConfigError(format!("无法绑定 {}: {}", address, e)))?;

        tracing::info!("Web 服务启动于 http://{}", address);

        axum::serve(listener, app)
            .await
            .map_err(|e| TranslationError::InternalError(format!("服务器错误: {}", e)))?;

        Ok(())
    }
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}
