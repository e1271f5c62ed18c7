//! 翻译网关
//!
//! 核心管道与外部翻译服务之间的唯一接口：提交一个有序字符串批次，
//! 得到等长、按位置对应的结果。
//!
//! ## 失败策略
//!
//! - 空批次不发起调用
//! - 结果长度不一致或结构异常（[`TranslationError::ShapeMismatch`]）在本地恢复，整批使用原文
//! - 单个元素不是字符串时，只有该元素回退为原文
//! - 网络、认证、配额错误向上传递，由调用方决定请求失败；这里不做重试

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::Batch;

/// 翻译服务接口
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// 翻译一个有序批次。返回值中不是字符串的元素视为"无译文"
    async fn translate(&self, target_language: &str, strings: &[String])
        -> TranslationResult<Vec<Value>>;

    /// 网关名称，用于日志
    fn name(&self) -> &str;
}

/// 把服务返回值与输入对齐
///
/// 长度不一致时整批回退；非字符串元素逐个回退。
pub fn reconcile(inputs: &[String], outputs: Vec<Value>) -> Vec<String> {
    if outputs.len() != inputs.len() {
        tracing::warn!(
            "翻译结果数量不匹配: 期望 {}, 实际 {}，使用原文",
            inputs.len(),
            outputs.len()
        );
        return inputs.to_vec();
    }

    outputs
        .into_iter()
        .zip(inputs)
        .map(|(output, input)| match output {
            Value::String(text) => text,
            _ => input.clone(),
        })
        .collect()
}

/// 翻译整个批次并套用失败回退规则
pub async fn translate_batch(
    gateway: &dyn TranslationGateway,
    target_language: &str,
    batch: &Batch,
) -> TranslationResult<Vec<String>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        "调用翻译网关 {}: {} 条文本, {} 个字符",
        gateway.name(),
        batch.len(),
        batch.char_count()
    );

    match gateway.translate(target_language, batch.texts()).await {
        Ok(outputs) => Ok(reconcile(batch.texts(), outputs)),
        Err(TranslationError::ShapeMismatch(msg)) => {
            tracing::warn!("翻译结果格式异常，使用原文: {}", msg);
            Ok(batch.texts().to_vec())
        }
        Err(e) => Err(e),
    }
}

/// 本地网关的应答方式
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 原样返回输入
    Identity,
    /// 按字典替换，字典里没有的保持原文
    Dictionary(HashMap<String, String>),
    /// 无论输入是什么都返回固定结果
    Fixed(Vec<Value>),
    /// 返回结构异常
    Malformed,
    /// 模拟传输失败
    Fail(String),
}

/// 不访问网络的网关，用于试运行和测试
#[derive(Debug)]
pub struct MockGateway {
    reply: MockReply,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockGateway {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn identity() -> Self {
        Self::new(MockReply::Identity)
    }

    /// 由 (原文, 译文) 列表构造字典网关
    pub fn dictionary<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self::new(MockReply::Dictionary(
            pairs
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        ))
    }

    /// 已收到的调用：(目标语言, 批次)
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TranslationGateway for MockGateway {
    async fn translate(
        &self,
        target_language: &str,
        strings: &[String],
    ) -> TranslationResult<Vec<Value>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((target_language.to_string(), strings.to_vec()));
        }

        match &self.reply {
            MockReply::Identity => Ok(strings.iter().cloned().map(Value::String).collect()),
            MockReply::Dictionary(dictionary) => Ok(strings
                .iter()
                .map(|s| Value::String(dictionary.get(s).cloned().unwrap_or_else(|| s.clone())))
                .collect()),
            MockReply::Fixed(values) => Ok(values.clone()),
            MockReply::Malformed => Err(TranslationError::ShapeMismatch(
                "missing translations array".to_string(),
            )),
            MockReply::Fail(msg) => Err(TranslationError::NetworkError(msg.clone())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
