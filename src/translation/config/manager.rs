//! 配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 翻译服务
    pub api_base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub target_lang: String,

    // 输入过滤
    pub strict_sniff: bool,
    pub skip_junk_paths: bool,
    pub skip_bundles: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            model: constants::DEFAULT_MODEL.to_string(),
            temperature: constants::DEFAULT_TEMPERATURE,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),

            strict_sniff: true,
            skip_junk_paths: true,
            skip_bundles: true,
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.model.trim().is_empty() {
            return Err(TranslationError::ConfigError("模型名称不能为空".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(TranslationError::ConfigError(format!(
                "温度必须在0到2之间: {}",
                self.temperature
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时不能为0".to_string()));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(TranslationError::ConfigError(format!(
                "API地址无效: {}",
                self.api_base_url
            )));
        }

        Ok(())
    }

    /// 应用环境变量覆盖（使用类型安全环境变量系统）
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{core, openai, EnvVar};

        if let Ok(api_key) = openai::ApiKey::get() {
            self.api_key = Some(api_key);
        }

        if let Ok(model) = openai::Model::get() {
            self.model = model;
        }

        if let Ok(base_url) = openai::BaseUrl::get() {
            self.api_base_url = base_url;
            tracing::info!("环境变量覆盖 API 地址: {}", self.api_base_url);
        }

        if std::env::var(openai::Timeout::NAME).is_ok() {
            match openai::Timeout::get() {
                Ok(timeout) => self.request_timeout_secs = timeout.as_secs(),
                Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
            }
        }

        if std::env::var(core::StrictSniff::NAME).is_ok() {
            self.strict_sniff = core::StrictSniff::get_or_default(self.strict_sniff);
        }

        if std::env::var(core::SkipBundles::NAME).is_ok() {
            self.skip_bundles = core::SkipBundles::get_or_default(self.skip_bundles);
        }
    }

    /// 转换为Duration类型
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 是否配置了翻译服务凭据
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<String>,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> TranslationResult<Self> {
        let (mut config, source) = Self::load_config(None)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 使用指定的配置文件创建
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        let expanded = shellexpand::tilde(path).to_string();
        if !Path::new(&expanded).exists() {
            return Err(TranslationError::ConfigError(format!(
                "配置文件不存在: {}",
                expanded
            )));
        }

        let (mut config, source) = Self::load_config(Some(expanded))?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// 分层加载：默认值、配置文件、PAGELINGO_ 前缀的环境变量
    fn load_config(
        explicit: Option<String>,
    ) -> TranslationResult<(TranslationConfig, Option<String>)> {
        // 首先尝试加载 .env 文件
        Self::load_dotenv();

        let mut builder = Config::builder().add_source(
            Config::try_from(&TranslationConfig::default())
                .map_err(|e| TranslationError::ConfigError(format!("默认配置错误: {}", e)))?,
        );

        let config_path = match explicit {
            Some(path) => Some(path),
            None => constants::CONFIG_PATHS
                .iter()
                .map(|path| shellexpand::tilde(path).to_string())
                .find(|path| Path::new(path).exists()),
        };

        match &config_path {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path);
                builder = builder.add_source(File::with_name(path));
            }
            None => tracing::info!("未找到配置文件，使用默认配置"),
        }

        builder = builder.add_source(
            Environment::with_prefix("PAGELINGO")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("构建配置失败: {}", e)))?;

        let translation_config: TranslationConfig = config
            .try_deserialize()
            .map_err(|e| TranslationError::ConfigError(format!("反序列化配置失败: {}", e)))?;

        tracing::debug!(
            "加载的配置 - 模型: {}, 目标语言: {}",
            translation_config.model,
            translation_config.target_lang
        );

        Ok((translation_config, config_path))
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TranslationConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = TranslationConfig::default();
        config.api_base_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());

        let mut config = TranslationConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_config_uses_defaults() {
        let config: TranslationConfig = toml::from_str(
            r#"
            model = "gpt-4o"
            target_lang = "de"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.target_lang, "de");
        assert!(config.strict_sniff, "Unspecified fields should keep defaults");
    }

    #[test]
    fn test_from_file_loads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagelingo.toml");
        std::fs::write(&path, "target_lang = \"ar\"\nskip_bundles = false\n").unwrap();

        let manager = ConfigManager::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(manager.get_config().target_lang, "ar");
        assert!(!manager.get_config().skip_bundles);
        assert!(manager.source().is_some());
    }

    #[test]
    fn test_from_file_missing_path() {
        assert!(ConfigManager::from_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_generate_example_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.toml");
        ConfigManager::generate_example_config(path.to_str().unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: TranslationConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.model, constants::DEFAULT_MODEL);
    }
}
