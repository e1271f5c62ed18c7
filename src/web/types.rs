//! Web 模块的数据类型定义

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::Dispatcher;
use crate::translation::pipeline::SubstitutionRules;

/// 应用状态
///
/// 未配置翻译凭据时 `dispatcher` 为空，翻译请求返回 500。
#[derive(Clone, Default)]
pub struct AppState {
    pub dispatcher: Option<Arc<Dispatcher>>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher: Some(dispatcher),
        }
    }

    /// 没有可用网关的状态
    pub fn unconfigured() -> Self {
        Self { dispatcher: None }
    }
}

/// 标记文档翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateMarkupRequest {
    pub html: Option<String>,
    pub target_lang: Option<String>,
    pub rtl: bool,
    pub rules: Option<SubstitutionRules>,
    pub file_path: Option<String>,
    pub filename: Option<String>,
}

/// 标记文档翻译响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateMarkupResponse {
    pub html: String,
}

/// 脚本翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateScriptRequest {
    pub code: Option<String>,
    pub target_lang: Option<String>,
    pub filename: Option<String>,
}

/// 脚本翻译响应
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateScriptResponse {
    pub code: String,
}

/// 通用文档翻译请求
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslateDocumentRequest {
    pub document_text: Option<String>,
    pub document_kind: Option<String>,
    pub target_language: Option<String>,
    pub rtl_requested: bool,
    pub substitution_rules: Option<SubstitutionRules>,
    pub path: Option<String>,
}

/// 通用文档翻译响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateDocumentResponse {
    pub document_text: String,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub translator: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_request_accepts_camel_case() {
        let request: TranslateMarkupRequest = serde_json::from_str(
            r#"{"html":"<p>Hi</p>","targetLang":"fr","filePath":"site/index.html",
                "rules":{"brand":{"enabled":true,"from":"Acme","to":"Globex"}}}"#,
        )
        .unwrap();

        assert_eq!(request.html.as_deref(), Some("<p>Hi</p>"));
        assert_eq!(request.target_lang.as_deref(), Some("fr"));
        assert_eq!(request.file_path.as_deref(), Some("site/index.html"));
        assert!(!request.rtl, "rtl defaults to false");
        let rules = request.rules.unwrap();
        assert_eq!(rules.brand.unwrap().to, "Globex");
    }

    #[test]
    fn test_document_request_fields_are_optional() {
        let request: TranslateDocumentRequest = serde_json::from_str("{}").unwrap();
        assert!(request.document_text.is_none());
        assert!(request.target_language.is_none());
        assert!(!request.rtl_requested);
    }

    #[test]
    fn test_document_response_is_camel_case() {
        let body = serde_json::to_value(TranslateDocumentResponse {
            document_text: "x".to_string(),
        })
        .unwrap();
        assert_eq!(body["documentText"], "x");
    }
}
