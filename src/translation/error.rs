//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型和错误处理机制

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 速率限制错误
    #[error("请求速率过快，已达到限制")]
    RateLimitExceeded,

    /// 输入验证错误
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 翻译服务错误（认证、配额、HTTP 状态）
    #[error("翻译服务错误: {0}")]
    ServiceError(String),

    /// 翻译结果结构不匹配，在本地回退为原文
    #[error("翻译结果格式不匹配: {0}")]
    ShapeMismatch(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    TimeoutError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 语法树无法生成或重建
    #[error("序列化能力不可用: {0}")]
    SerializerUnavailable(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 压缩包处理错误
    #[error("压缩包错误: {0}")]
    ArchiveError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TranslationError::ConfigError(_) => ErrorSeverity::Critical,
            TranslationError::NetworkError(_) => ErrorSeverity::Warning,
            TranslationError::RateLimitExceeded => ErrorSeverity::Warning,
            TranslationError::InvalidInput(_) => ErrorSeverity::Info,
            TranslationError::ServiceError(_) => ErrorSeverity::Error,
            TranslationError::ShapeMismatch(_) => ErrorSeverity::Warning,
            TranslationError::TimeoutError(_) => ErrorSeverity::Warning,
            TranslationError::ParseError(_) => ErrorSeverity::Error,
            TranslationError::SerializerUnavailable(_) => ErrorSeverity::Warning,
            TranslationError::SerializationError(_) => ErrorSeverity::Error,
            TranslationError::ArchiveError(_) => ErrorSeverity::Error,
            TranslationError::InternalError(_) => ErrorSeverity::Critical,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::RateLimitExceeded => ErrorCategory::RateLimit,
            TranslationError::InvalidInput(_) => ErrorCategory::Input,
            TranslationError::ServiceError(_) => ErrorCategory::Service,
            TranslationError::ShapeMismatch(_) => ErrorCategory::Service,
            TranslationError::TimeoutError(_) => ErrorCategory::Timeout,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::SerializerUnavailable(_) => ErrorCategory::Serialization,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::ArchiveError(_) => ErrorCategory::Archive,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(mut self, context: T) -> Self {
        let current_msg = self.to_string();
        let new_msg = format!("{} (上下文: {})", current_msg, context);

        match &mut self {
            TranslationError::ConfigError(ref mut msg) => *msg = new_msg,
            TranslationError::NetworkError(ref mut msg) => *msg = new_msg,
            TranslationError::InvalidInput(ref mut msg) => *msg = new_msg,
            TranslationError::ServiceError(ref mut msg) => *msg = new_msg,
            TranslationError::ShapeMismatch(ref mut msg) => *msg = new_msg,
            TranslationError::TimeoutError(ref mut msg) => *msg = new_msg,
            TranslationError::ParseError(ref mut msg) => *msg = new_msg,
            TranslationError::SerializerUnavailable(ref mut msg) => *msg = new_msg,
            TranslationError::SerializationError(ref mut msg) => *msg = new_msg,
            TranslationError::ArchiveError(ref mut msg) => *msg = new_msg,
            TranslationError::InternalError(ref mut msg) => *msg = new_msg,
            TranslationError::RateLimitExceeded => {
                return TranslationError::RateLimitExceeded;
            }
        }

        self
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    RateLimit,
    Input,
    Service,
    Timeout,
    Parsing,
    Serialization,
    Archive,
    Internal,
}

/// 标准错误转换
impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::InternalError(format!("IO错误: {}", error))
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(error: config::ConfigError) -> Self {
        TranslationError::ConfigError(format!("配置错误: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for TranslationError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        TranslationError::TimeoutError(format!("异步操作超时: {}", error))
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TranslationError::TimeoutError(format!("翻译请求超时: {}", error))
        } else if error.is_decode() {
            TranslationError::ShapeMismatch(format!("响应解码失败: {}", error))
        } else {
            TranslationError::NetworkError(format!("HTTP请求失败: {}", error))
        }
    }
}

impl From<zip::result::ZipError> for TranslationError {
    fn from(error: zip::result::ZipError) -> Self {
        TranslationError::ArchiveError(format!("ZIP处理失败: {}", error))
    }
}

impl From<walkdir::Error> for TranslationError {
    fn from(error: walkdir::Error) -> Self {
        TranslationError::ArchiveError(format!("目录遍历失败: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn trace_error(error: &TranslationError) {
        match error.severity() {
            ErrorSeverity::Info => tracing::info!("翻译信息: {}", error),
            ErrorSeverity::Warning => tracing::warn!("翻译警告: {}", error),
            ErrorSeverity::Error => tracing::error!("翻译错误: {}", error),
            ErrorSeverity::Critical => tracing::error!("翻译严重错误: {}", error),
        }
    }

    /// 记录并返回错误
    pub fn log_error<T>(error: TranslationError) -> TranslationResult<T> {
        trace_error(&error);
        Err(error)
    }

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::ConfigError(msg.to_string())
    }

    /// 创建输入验证错误
    pub fn validation_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InvalidInput(msg.to_string())
    }

    /// 创建内部错误
    pub fn internal_error<T: fmt::Display>(msg: T) -> TranslationError {
        TranslationError::InternalError(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_is_a_service_warning() {
        let error = TranslationError::ShapeMismatch("length 2 != 3".to_string());
        assert_eq!(error.category(), ErrorCategory::Service);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_input_errors_are_least_severe() {
        let input = TranslationError::InvalidInput("missing targetLang".into());
        assert_eq!(input.category(), ErrorCategory::Input);
        assert_eq!(input.severity(), ErrorSeverity::Info);

        assert!(TranslationError::ParseError("bad".into()).severity() > input.severity());
        assert_eq!(
            TranslationError::ConfigError("no key".into()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            TranslationError::ArchiveError("broken".into()).category(),
            ErrorCategory::Archive
        );
    }

    #[test]
    fn test_with_context_appends_message() {
        let error = TranslationError::ArchiveError("broken".into()).with_context("site/index.html");
        let message = error.to_string();
        assert!(message.contains("broken"), "Original message should be kept");
        assert!(message.contains("site/index.html"), "Context should be appended");
    }

    #[test]
    fn test_rate_limit_context_is_unchanged() {
        let error = TranslationError::RateLimitExceeded.with_context("ignored");
        assert!(matches!(error, TranslationError::RateLimitExceeded));
    }

    #[test]
    fn test_log_error_returns_err() {
        let result: TranslationResult<()> =
            helpers::log_error(helpers::validation_error("missing targetLang"));
        assert!(matches!(result, Err(TranslationError::InvalidInput(_))));
    }
}
