//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 二进制内容探测
    pub const SNIFF_WINDOW_CHARS: usize = 2048;
    pub const MAX_REPLACEMENT_CHARS: usize = 5;
    pub const STRICT_BAD_CHAR_RATIO: f64 = 0.02;

    // 资源分叉/元数据路径
    pub const JUNK_DIRECTORY: &str = "__MACOSX";
    pub const JUNK_SEGMENT_PREFIX: &str = "._";

    // 文本分类
    pub const CODE_LENGTH_THRESHOLD: usize = 80;

    pub const EVENT_NAMES: &[&str] = &["click", "submit", "scroll", "load", "DOMContentLoaded"];

    pub const ANALYTICS_PREFIXES: &[&str] = &["utm_", "ga_", "gtm_", "fbq", "dataLayer"];

    // 标记文档中不可见的元素
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "noscript", "code", "pre"];

    // 可翻译属性
    pub const TRANSLATABLE_ATTRS: &[&str] = &["placeholder", "title", "aria-label", "alt", "value"];

    // 第一个参数通常是选择器、事件名、键或URL的方法
    pub const STRUCTURAL_METHODS: &[&str] = &[
        "querySelector",
        "querySelectorAll",
        "getElementById",
        "getElementsByClassName",
        "addEventListener",
        "removeEventListener",
        "setAttribute",
        "getAttribute",
        "fetch",
        "open",
        "send",
        "getItem",
        "setItem",
    ];

    // 赋值时承载可见文本的属性名
    pub const TEXT_PROPERTIES: &[&str] = &[
        "textContent",
        "innerText",
        "placeholder",
        "title",
        "alt",
        "value",
        "ariaLabel",
    ];

    // 对象字面量中承载文案的键名
    pub const PROSE_KEYS: &[&str] = &[
        "text",
        "title",
        "message",
        "label",
        "caption",
        "placeholder",
        "subtitle",
        "headline",
        "description",
        "tooltip",
        "hint",
    ];

    // 脚本内 JSX 的可翻译属性
    pub const JSX_TEXT_ATTRS: &[&str] = &[
        "title",
        "placeholder",
        "aria-label",
        "aria-description",
        "alt",
        "value",
        "label",
    ];

    // 被视为压缩产物的脚本路径片段
    pub const BUNDLE_MARKERS: &[&str] = &[".min.", "/dist/", "/build/"];

    // 默认API设置
    pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;
    pub const DEFAULT_TARGET_LANG: &str = "fr";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "pagelingo.toml",
        ".pagelingo.toml",
        "~/.config/pagelingo/config.toml",
        "/etc/pagelingo/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时回退到默认配置
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.get_config().clone(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            let mut config = TranslationConfig::default();
            config.apply_env_overrides();
            config
        }
    }
}
