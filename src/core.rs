//! 文档分发器
//!
//! 每个请求只有两种结果：
//!
//! - `Passthrough`：原样返回输入（垃圾路径、二进制内容、语法能力不可用、没有可翻译内容）
//! - `Transformed`：完整执行 解析 → 遍历 → 批次 → 翻译 → 回写 → 序列化
//!
//! 一个请求要么立即短路，要么完整执行一次管道，不存在中间状态，也不做重试。
//! 整个管道只有一个挂起点：提交批次的那一次网关调用。

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::parsers::html::{
    parse_markup, rtl_direction_edits, serialize_markup, MarkupWalker, MarkupWalkerConfig,
};
use crate::parsers::js::{
    is_available, parse_script, ScriptDialect, ScriptWalker, ScriptWalkerConfig,
};
use crate::parsers::splice::{splice_edits, SpliceEdit};
use crate::translation::config::TranslationConfig;
use crate::translation::core::{translate_batch, TranslationGateway};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::{
    reinsert, ClassifierConfig, CollectionStats, CompiledRules, SubstitutionRules, TextClassifier,
    TextCollector,
};
use crate::utils::{is_binary_with, is_junk_path};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Markup,
    Script,
}

impl DocumentKind {
    /// 根据扩展名判断文档类型，无法识别时返回 None
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())?;

        match extension.as_str() {
            "html" | "htm" => Some(DocumentKind::Markup),
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => {
                Some(DocumentKind::Script)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Markup => "markup",
            DocumentKind::Script => "script",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markup" | "html" => Ok(DocumentKind::Markup),
            "script" | "js" | "javascript" | "ts" | "typescript" => Ok(DocumentKind::Script),
            other => Err(TranslationError::InvalidInput(format!(
                "未知的文档类型: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单个文档的翻译请求
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub text: String,
    pub kind: DocumentKind,
    pub target_language: String,
    pub rtl: bool,
    pub rules: SubstitutionRules,
    /// 文档路径，用于垃圾路径判断和脚本方言选择
    pub path: Option<String>,
}

impl DocumentRequest {
    pub fn new(text: impl Into<String>, kind: DocumentKind, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            target_language: target_language.into(),
            rtl: false,
            rules: SubstitutionRules::default(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    pub fn with_rules(mut self, rules: SubstitutionRules) -> Self {
        self.rules = rules;
        self
    }
}

/// 原样返回的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughReason {
    JunkPath,
    Binary,
    SerializerUnavailable,
    NothingToTranslate,
}

impl fmt::Display for PassthroughReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            PassthroughReason::JunkPath => "元数据路径",
            PassthroughReason::Binary => "二进制或乱码内容",
            PassthroughReason::SerializerUnavailable => "语法能力不可用",
            PassthroughReason::NothingToTranslate => "没有需要翻译的内容",
        };
        write!(f, "{}", reason)
    }
}

/// 一次完整管道的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub extracted: usize,
    pub unique: usize,
    pub skipped: usize,
    pub written: usize,
    pub rtl_applied: bool,
}

/// 请求结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Passthrough {
        text: String,
        reason: PassthroughReason,
    },
    Transformed {
        text: String,
        stats: DispatchStats,
    },
}

impl DispatchOutcome {
    pub fn text(&self) -> &str {
        match self {
            DispatchOutcome::Passthrough { text, .. } | DispatchOutcome::Transformed { text, .. } => {
                text
            }
        }
    }

    pub fn into_text(self) -> String {
        match self {
            DispatchOutcome::Passthrough { text, .. } | DispatchOutcome::Transformed { text, .. } => {
                text
            }
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, DispatchOutcome::Passthrough { .. })
    }
}

/// 分发器选项
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    pub classifier: ClassifierConfig,
    pub markup: MarkupWalkerConfig,
    pub script: ScriptWalkerConfig,
    pub strict_sniff: bool,
    pub skip_junk_paths: bool,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            markup: MarkupWalkerConfig::default(),
            script: ScriptWalkerConfig::default(),
            strict_sniff: true,
            skip_junk_paths: true,
        }
    }
}

impl DispatcherOptions {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            strict_sniff: config.strict_sniff,
            skip_junk_paths: config.skip_junk_paths,
            ..Default::default()
        }
    }
}

/// 文档分发器，负责协调整个文档处理流程
///
/// 解析和遍历是同步的 CPU 工作；多线程运行时中的调用方应在阻塞工作线程上驱动它。
pub struct Dispatcher {
    gateway: Arc<dyn TranslationGateway>,
    classifier: TextClassifier,
    options: DispatcherOptions,
}

impl Dispatcher {
    pub fn new(gateway: Arc<dyn TranslationGateway>, options: DispatcherOptions) -> Self {
        Self {
            gateway,
            classifier: TextClassifier::new(options.classifier.clone()),
            options,
        }
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// 处理一个文档请求
    pub async fn dispatch(&self, request: DocumentRequest) -> TranslationResult<DispatchOutcome> {
        // 1. 垃圾路径短路
        if self.options.skip_junk_paths && request.path.as_deref().is_some_and(is_junk_path) {
            return Ok(passthrough(request.text, PassthroughReason::JunkPath));
        }

        // 2. 二进制/乱码短路，不调用解析器和网关
        if is_binary_with(&request.text, self.options.strict_sniff) {
            tracing::debug!("检测到二进制内容，原样返回: {:?}", request.path);
            return Ok(passthrough(request.text, PassthroughReason::Binary));
        }

        if request.target_language.trim().is_empty() {
            return Err(TranslationError::InvalidInput("缺少目标语言".to_string()));
        }

        // 3. 编译替换规则
        let rules = request.rules.compile()?;

        // 4. 按文档类型执行管道
        let outcome = match request.kind {
            DocumentKind::Markup => self.translate_markup(request, rules).await?,
            DocumentKind::Script => self.translate_script(request, rules).await?,
        };

        match &outcome {
            DispatchOutcome::Transformed { stats, .. } => tracing::info!(
                "文档翻译完成: 提取 {} 处, 去重后 {} 条, 写回 {} 处",
                stats.extracted,
                stats.unique,
                stats.written
            ),
            DispatchOutcome::Passthrough { reason, .. } => {
                tracing::info!("文档原样返回: {}", reason)
            }
        }

        Ok(outcome)
    }

    async fn translate_markup(
        &self,
        request: DocumentRequest,
        rules: CompiledRules,
    ) -> TranslationResult<DispatchOutcome> {
        let Some(tree) = parse_markup(&request.text) else {
            tracing::warn!("标记令牌无法与源码对齐，原样返回: {:?}", request.path);
            return Ok(passthrough(request.text, PassthroughReason::SerializerUnavailable));
        };

        let mut collector = TextCollector::new(rules);
        MarkupWalker::new(&self.options.markup, &self.classifier).walk(&tree, &mut collector);
        let collected = collector.stats();
        log_collection(DocumentKind::Markup, &collected);

        let (batch, items) = collector.finish();
        let translations =
            translate_batch(self.gateway.as_ref(), &request.target_language, &batch).await?;

        let mut edits = Vec::new();
        let written = reinsert(&items, &translations, |slot, value| {
            edits.push(SpliceEdit {
                start: slot.span.start,
                end: slot.span.end,
                replacement: slot.render(value),
            })
        });

        let rtl_edits = if request.rtl {
            rtl_direction_edits(&tree)
        } else {
            Vec::new()
        };
        let rtl_applied = !rtl_edits.is_empty();
        if written.written == 0 && !rtl_applied {
            return Ok(passthrough(request.text, PassthroughReason::NothingToTranslate));
        }

        edits.extend(rtl_edits);
        let text = serialize_markup(&tree, edits)?;
        Ok(DispatchOutcome::Transformed {
            text,
            stats: DispatchStats {
                extracted: collected.extracted,
                unique: collected.unique,
                skipped: collected.skipped,
                written: written.written,
                rtl_applied,
            },
        })
    }

    async fn translate_script(
        &self,
        request: DocumentRequest,
        rules: CompiledRules,
    ) -> TranslationResult<DispatchOutcome> {
        let dialect = ScriptDialect::from_path(request.path.as_deref());
        if !is_available(dialect) {
            return Ok(passthrough(request.text, PassthroughReason::SerializerUnavailable));
        }

        let tree = match parse_script(&request.text, dialect) {
            Ok(tree) => tree,
            Err(TranslationError::SerializerUnavailable(_)) => {
                return Ok(passthrough(request.text, PassthroughReason::SerializerUnavailable));
            }
            Err(e) => {
                let context = request.path.as_deref().unwrap_or("<script>");
                return Err(e.with_context(context));
            }
        };

        let mut collector = TextCollector::new(rules);
        ScriptWalker::new(&self.options.script, &self.classifier).walk(&tree, &mut collector);
        let collected = collector.stats();
        log_collection(DocumentKind::Script, &collected);

        let (batch, items) = collector.finish();
        let translations =
            translate_batch(self.gateway.as_ref(), &request.target_language, &batch).await?;

        let mut edits = Vec::new();
        let written = reinsert(&items, &translations, |slot, value| {
            edits.push(SpliceEdit {
                start: slot.start,
                end: slot.end,
                replacement: slot.render(value),
            })
        });

        if written.written == 0 {
            return Ok(passthrough(request.text, PassthroughReason::NothingToTranslate));
        }

        let text = splice_edits(tree.source(), edits)?;
        Ok(DispatchOutcome::Transformed {
            text,
            stats: DispatchStats {
                extracted: collected.extracted,
                unique: collected.unique,
                skipped: collected.skipped,
                written: written.written,
                rtl_applied: false,
            },
        })
    }
}

fn passthrough(text: String, reason: PassthroughReason) -> DispatchOutcome {
    DispatchOutcome::Passthrough { text, reason }
}

fn log_collection(kind: DocumentKind, stats: &CollectionStats) {
    tracing::debug!(
        "{} 遍历完成: 提取 {} 处, 去重后 {} 条, 跳过 {} 处",
        kind,
        stats.extracted,
        stats.unique,
        stats.skipped
    );
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
