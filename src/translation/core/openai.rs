//! OpenAI 兼容的翻译网关
//!
//! 通过 chat completions 接口翻译批次，要求模型返回 `{"translations": [...]}`。

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::gateway::TranslationGateway;
use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

const SYSTEM_PROMPT: &str = "You translate user interface text. Return ONLY valid JSON with key \
'translations' as an array of strings of the same length and order as the input. Do NOT translate \
selectors, code, keys, event names, URLs or placeholders. Do NOT add commentary.";

/// OpenAI 兼容网关
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiGateway {
    /// 从配置创建，缺少凭据时返回配置错误
    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TranslationError::ConfigError("OPENAI_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// 构建请求体
    fn request_body(&self, target_language: &str, strings: &[String]) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": json!({ "targetLang": target_language, "strings": strings }).to_string()
                }
            ]
        })
    }
}

/// 从 chat completions 响应中取出 translations 数组
pub fn extract_translations(response: &Value) -> TranslationResult<Vec<Value>> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::ShapeMismatch("响应中没有消息内容".to_string()))?;

    let data: Value = serde_json::from_str(content)
        .map_err(|e| TranslationError::ShapeMismatch(format!("消息内容不是JSON: {}", e)))?;

    match data.get("translations") {
        Some(Value::Array(items)) => Ok(items.clone()),
        _ => Err(TranslationError::ShapeMismatch(
            "缺少 translations 数组".to_string(),
        )),
    }
}

fn status_error(status: StatusCode, body: &str) -> TranslationError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => TranslationError::RateLimitExceeded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TranslationError::ServiceError(format!("认证失败 ({})", status))
        }
        _ => {
            let snippet: String = body.chars().take(200).collect();
            TranslationError::ServiceError(format!("HTTP {}: {}", status, snippet))
        }
    }
}

#[async_trait]
impl TranslationGateway for OpenAiGateway {
    async fn translate(
        &self,
        target_language: &str,
        strings: &[String],
    ) -> TranslationResult<Vec<Value>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(target_language, strings))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let payload: Value = response.json().await?;
        extract_translations(&payload)
    }

    fn name(&self) -> &str {
        &self.model
    }
}


#[cfg(all(test, feature = "web"))]
mod http_tests {
    use std::net::SocketAddr;

    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    use super::*;
    use crate::translation::core::translate_batch;
    use crate::translation::pipeline::Batch;

    /// 按 `[语言] 原文` 回显每个字符串
    async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer sk-test");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid key" })));
        }

        let user: Value =
            serde_json::from_str(body["messages"][1]["content"].as_str().unwrap_or("{}")).unwrap();
        let lang = user["targetLang"].as_str().unwrap_or_default();
        let translations: Vec<String> = user["strings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| format!("[{}] {}", lang, s.as_str().unwrap_or_default()))
            .collect();

        let content = json!({ "translations": translations }).to_string();
        (
            StatusCode::OK,
            Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })),
        )
    }

    async fn chatty() -> Json<Value> {
        Json(json!({ "choices": [{ "message": { "content": "Sure, here are your translations" } }] }))
    }

    async fn start_server() -> SocketAddr {
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .route("/chatty/chat/completions", post(chatty))
            .route(
                "/limited/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn gateway(addr: SocketAddr, base: &str, key: &str) -> OpenAiGateway {
        let config = TranslationConfig {
            api_key: Some(key.to_string()),
            api_base_url: format!("http://{}/{}", addr, base),
            ..Default::default()
        };
        OpenAiGateway::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_translate_round_trip() {
        let addr = start_server().await;
        let gateway = gateway(addr, "v1", "sk-test");

        let items = gateway
            .translate("fr", &["Submit".to_string(), "Click me".to_string()])
            .await
            .unwrap();

        assert_eq!(items, vec![json!("[fr] Submit"), json!("[fr] Click me")]);
    }

    #[tokio::test]
    async fn test_round_trip_through_batch() {
        let addr = start_server().await;
        let gateway = gateway(addr, "v1/", "sk-test");

        let mut batch = Batch::new();
        batch.insert("Welcome home".to_string());
        let translations = translate_batch(&gateway, "de", &batch).await.unwrap();
        assert_eq!(translations, vec!["[de] Welcome home".to_string()]);
    }

    #[tokio::test]
    async fn test_http_failures() {
        let addr = start_server().await;

        let err = gateway(addr, "v1", "sk-wrong")
            .translate("fr", &["Submit".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::ServiceError(_)), "{:?}", err);

        let err = gateway(addr, "limited", "sk-test")
            .translate("fr", &["Submit".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::RateLimitExceeded));

        let err = gateway(addr, "chatty", "sk-test")
            .translate("fr", &["Submit".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::ShapeMismatch(_)));
    }
}
