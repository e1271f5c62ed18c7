//! Web 路由定义

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::{handlers::*, types::AppState};

/// 创建路由结构
///
/// 翻译入口只接受 POST，其它方法由路由返回 405。
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/translate", post(translate_markup))
        .route("/api/translate-js", post(translate_script))
        .route("/api/translate-document", post(translate_document))
}
