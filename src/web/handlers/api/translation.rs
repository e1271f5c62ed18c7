//! 翻译相关的API处理器
//!
//! 三个入口共享同一条分发管道，只在请求/响应字段上有所不同。

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::json;
use tokio::{runtime::Handle, task};

use crate::core::{DocumentKind, DocumentRequest};
use crate::translation::error::{helpers, ErrorCategory, TranslationError};
use crate::web::types::{
    AppState, HealthResponse, TranslateDocumentRequest, TranslateDocumentResponse,
    TranslateMarkupRequest, TranslateMarkupResponse, TranslateScriptRequest,
    TranslateScriptResponse,
};

/// 处理器错误：状态码与 `{ "error": message }`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

fn bad_request(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 标记文档翻译
pub async fn translate_markup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateMarkupRequest>, JsonRejection>,
) -> Result<Json<TranslateMarkupResponse>, ApiError> {
    ensure_configured(&state)?;
    let Json(request) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let (Some(html), Some(target_lang)) = (request.html, non_empty(request.target_lang)) else {
        return Err(bad_request("Missing html or targetLang"));
    };

    let mut document = DocumentRequest::new(html, DocumentKind::Markup, target_lang)
        .with_rtl(request.rtl)
        .with_rules(request.rules.unwrap_or_default());
    if let Some(path) = request.file_path.or(request.filename) {
        document = document.with_path(path);
    }

    let html = run_dispatch(&state, document).await?;
    Ok(Json(TranslateMarkupResponse { html }))
}

/// 脚本翻译
pub async fn translate_script(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateScriptRequest>, JsonRejection>,
) -> Result<Json<TranslateScriptResponse>, ApiError> {
    ensure_configured(&state)?;
    let Json(request) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let (Some(code), Some(target_lang)) = (request.code, non_empty(request.target_lang)) else {
        return Err(bad_request("Bad request"));
    };

    let mut document = DocumentRequest::new(code, DocumentKind::Script, target_lang);
    if let Some(filename) = request.filename {
        document = document.with_path(filename);
    }

    let code = run_dispatch(&state, document).await?;
    Ok(Json(TranslateScriptResponse { code }))
}

/// 通用文档翻译
///
/// 未给出 `documentKind` 时按 `path` 的扩展名推断。
pub async fn translate_document(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateDocumentRequest>, JsonRejection>,
) -> Result<Json<TranslateDocumentResponse>, ApiError> {
    ensure_configured(&state)?;
    let Json(request) = payload.map_err(|e| bad_request(&e.body_text()))?;

    let (Some(text), Some(target_language)) =
        (request.document_text, non_empty(request.target_language))
    else {
        return Err(bad_request("Missing documentText or targetLanguage"));
    };

    let kind = match request.document_kind.as_deref() {
        Some(kind) => kind
            .parse::<DocumentKind>()
            .map_err(|e| bad_request(&e.to_string()))?,
        None => request
            .path
            .as_deref()
            .and_then(DocumentKind::from_path)
            .ok_or_else(|| bad_request("Missing documentKind"))?,
    };

    let mut document = DocumentRequest::new(text, kind, target_language)
        .with_rtl(request.rtl_requested)
        .with_rules(request.substitution_rules.unwrap_or_default());
    if let Some(path) = request.path {
        document = document.with_path(path);
    }

    let document_text = run_dispatch(&state, document).await?;
    Ok(Json(TranslateDocumentResponse { document_text }))
}

/// 健康检查
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        translator: state
            .dispatcher
            .as_ref()
            .map(|dispatcher| dispatcher.gateway_name().to_string()),
    })
}

fn ensure_configured(state: &AppState) -> Result<(), ApiError> {
    if state.dispatcher.is_none() {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OPENAI_API_KEY not set",
        ));
    }
    Ok(())
}

/// 在阻塞线程上执行分发
///
/// 分词、遍历和拼接都是同步的 CPU 工作，整个管道放在阻塞工作线程上完成。
async fn run_dispatch(state: &AppState, request: DocumentRequest) -> Result<String, ApiError> {
    let dispatcher = state.dispatcher.clone().ok_or_else(|| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "OPENAI_API_KEY not set")
    })?;

    let kind = request.kind;
    let path = request.path.clone();
    let handle = Handle::current();

    let result = task::spawn_blocking(move || handle.block_on(dispatcher.dispatch(request)))
        .await
        .map_err(|e| helpers::internal_error(format!("翻译任务异常终止: {}", e)))
        .and_then(|outcome| outcome);

    match result {
        Ok(outcome) => {
            tracing::info!("{} 文档请求完成: {:?}", kind, path);
            Ok(outcome.into_text())
        }
        Err(error) => {
            tracing::debug!("{} 文档请求失败: {:?}", kind, path);
            helpers::trace_error(&error);
            Err(api_error(status_for(&error), error.to_string()))
        }
    }
}

/// 输入类错误返回 400，其余一律 500
pub fn status_for(error: &TranslationError) -> StatusCode {
    match error.category() {
        ErrorCategory::Input => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
