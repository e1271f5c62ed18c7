//! 压缩包与目录批量处理
//!
//! 逐个成员顺序处理：标记和脚本成员交给分发器翻译，其余成员原样复制。
//! 任一成员出现请求级错误时中止整个压缩包，错误信息带上成员路径。

use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use encoding_rs::Encoding;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::{DispatchOutcome, Dispatcher, DocumentKind, DocumentRequest};
use crate::translation::config::constants;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::pipeline::SubstitutionRules;
use crate::utils::is_junk_path;

/// 压缩包中的一个成员
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub is_dir: bool,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            data: data.into(),
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            data: Vec::new(),
        }
    }

    /// 读取文本内容
    ///
    /// 带 BOM 时按 BOM 指明的编码解码（支持 UTF-16），否则要求是合法 UTF-8。
    pub fn read_text(&self) -> Option<String> {
        if let Some((encoding, bom_length)) = Encoding::for_bom(&self.data) {
            let (text, had_errors) =
                encoding.decode_without_bom_handling(&self.data[bom_length..]);
            return (!had_errors).then(|| text.into_owned());
        }

        String::from_utf8(self.data.clone()).ok()
    }

    /// 把翻译后的文本编码为成员内容
    ///
    /// 原内容带 UTF-8 BOM 时保留 BOM；UTF-16 成员以 UTF-8 写出。
    pub fn encode_text(&self, text: &str) -> Vec<u8> {
        let mut data = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.data.starts_with(UTF8_BOM) {
            data.extend_from_slice(UTF8_BOM);
        }
        data.extend_from_slice(text.as_bytes());
        data
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 成员写入目标
pub trait EntrySink {
    fn write_entry(&mut self, path: &str, data: &[u8]) -> TranslationResult<()>;

    fn add_directory(&mut self, _path: &str) -> TranslationResult<()> {
        Ok(())
    }
}

/// 写入 zip
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
        }
    }

    pub fn finish(mut self) -> TranslationResult<W> {
        Ok(self.writer.finish()?)
    }

    fn options() -> FileOptions {
        FileOptions::default().compression_method(CompressionMethod::Deflated)
    }
}

impl<W: Write + Seek> EntrySink for ZipSink<W> {
    fn write_entry(&mut self, path: &str, data: &[u8]) -> TranslationResult<()> {
        self.writer.start_file(path, Self::options())?;
        self.writer.write_all(data)?;
        Ok(())
    }

    fn add_directory(&mut self, path: &str) -> TranslationResult<()> {
        self.writer.add_directory(path, Self::options())?;
        Ok(())
    }
}

/// 写入目录树
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> TranslationResult<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));

        if !safe {
            return Err(TranslationError::ArchiveError(format!(
                "成员路径越出输出目录: {}",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

impl EntrySink for DirSink {
    fn write_entry(&mut self, path: &str, data: &[u8]) -> TranslationResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        Ok(())
    }

    fn add_directory(&mut self, path: &str) -> TranslationResult<()> {
        fs::create_dir_all(self.resolve(path)?)?;
        Ok(())
    }
}

/// 读取 zip 中的全部成员，保持原有顺序
pub fn read_zip<R: Read + Seek>(reader: R) -> TranslationResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let path = file.name().to_string();

        if file.is_dir() {
            entries.push(ArchiveEntry::directory(path));
            continue;
        }

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        entries.push(ArchiveEntry::file(path, data));
    }

    Ok(entries)
}

/// 读取目录树中的全部文件，路径使用 `/` 分隔，按路径排序
pub fn read_dir_tree(root: &Path) -> TranslationResult<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            entries.push(ArchiveEntry::directory(format!("{}/", path)));
        } else if entry.file_type().is_file() {
            entries.push(ArchiveEntry::file(path, fs::read(entry.path())?));
        }
    }

    Ok(entries)
}

/// 批量处理选项
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub target_language: String,
    pub rtl: bool,
    pub rules: SubstitutionRules,
    /// 压缩产物形态的脚本原样复制
    pub skip_bundles: bool,
}

impl ArchiveOptions {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            rtl: false,
            rules: SubstitutionRules::default(),
            skip_bundles: true,
        }
    }
}

/// 批量处理结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub translated: usize,
    pub skipped: usize,
    pub total: usize,
}

/// 路径是否像压缩产物（`.min.`、`/dist/`、`/build/`）
pub fn is_bundle_path(path: &str) -> bool {
    let normalized = format!("/{}", path.replace('\\', "/").to_lowercase());
    constants::BUNDLE_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

/// 顺序处理所有成员并写入 `sink`
pub async fn translate_entries<S: EntrySink>(
    dispatcher: &Dispatcher,
    entries: Vec<ArchiveEntry>,
    options: &ArchiveOptions,
    sink: &mut S,
) -> TranslationResult<ArchiveReport> {
    let mut report = ArchiveReport::default();

    for entry in entries {
        if entry.is_dir {
            sink.add_directory(&entry.path)?;
            continue;
        }

        report.total += 1;

        let Some((kind, text)) = translatable_text(dispatcher, &entry, options) else {
            tracing::debug!("原样复制: {}", entry.path);
            sink.write_entry(&entry.path, &entry.data)?;
            report.skipped += 1;
            continue;
        };

        let request = DocumentRequest::new(text, kind, options.target_language.clone())
            .with_path(entry.path.clone())
            .with_rtl(options.rtl)
            .with_rules(options.rules.clone());

        let outcome = match dispatcher.dispatch(request).await {
            Ok(outcome) => outcome,
            Err(e) => return helpers::log_error(e.with_context(format!("成员 {}", entry.path))),
        };

        match outcome {
            DispatchOutcome::Transformed { text, .. } => {
                sink.write_entry(&entry.path, &entry.encode_text(&text))?;
                report.translated += 1;
            }
            DispatchOutcome::Passthrough { .. } => {
                // 原样返回时写入原始字节
                sink.write_entry(&entry.path, &entry.data)?;
                report.skipped += 1;
            }
        }
    }

    tracing::info!(
        "批量处理完成: 共 {} 个文件, 翻译 {} 个, 原样复制 {} 个",
        report.total,
        report.translated,
        report.skipped
    );

    Ok(report)
}

fn translatable_text(
    dispatcher: &Dispatcher,
    entry: &ArchiveEntry,
    options: &ArchiveOptions,
) -> Option<(DocumentKind, String)> {
    if dispatcher.options().skip_junk_paths && is_junk_path(&entry.path) {
        return None;
    }

    let kind = DocumentKind::from_path(&entry.path)?;
    if kind == DocumentKind::Script && options.skip_bundles && is_bundle_path(&entry.path) {
        return None;
    }

    entry.read_text().map(|text| (kind, text))
}

/// 翻译 zip 数据，返回新的 zip 数据
pub async fn translate_zip_bytes(
    dispatcher: &Dispatcher,
    input: &[u8],
    options: &ArchiveOptions,
) -> TranslationResult<(Vec<u8>, ArchiveReport)> {
    let entries = read_zip(Cursor::new(input))?;
    let mut sink = ZipSink::new(Cursor::new(Vec::new()));
    let report = translate_entries(dispatcher, entries, options, &mut sink).await?;
    Ok((sink.finish()?.into_inner(), report))
}

/// 翻译 zip 文件
pub async fn translate_zip_file(
    dispatcher: &Dispatcher,
    input: &Path,
    output: &Path,
    options: &ArchiveOptions,
) -> TranslationResult<ArchiveReport> {
    let data = fs::read(input)?;
    let (translated, report) = translate_zip_bytes(dispatcher, &data, options).await?;
    fs::write(output, translated)?;
    Ok(report)
}

/// 翻译目录树到另一个目录
pub async fn translate_directory(
    dispatcher: &Dispatcher,
    input: &Path,
    output: &Path,
    options: &ArchiveOptions,
) -> TranslationResult<ArchiveReport> {
    let entries = read_dir_tree(input)?;
    let mut sink = DirSink::new(output);
    translate_entries(dispatcher, entries, options, &mut sink).await
}

/// 输出压缩包名称：自定义名称清理后使用，否则为 `<原名>_<语言>.zip`
pub fn output_name(original: &str, target_language: &str, custom: Option<&str>) -> String {
    if let Some(custom) = custom {
        let cleaned = custom
            .trim()
            .replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
            .trim_start_matches('.')
            .to_string();

        if !cleaned.is_empty() {
            return if cleaned.to_lowercase().ends_with(".zip") {
                cleaned
            } else {
                format!("{}.zip", cleaned)
            };
        }
    }

    let base = Path::new(original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("archive");

    format!("{}_{}.zip", base, target_language)
}
