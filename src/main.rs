//! 命令行入口

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pagelingo::archive::{
    output_name, read_dir_tree, read_zip, translate_directory, translate_entries,
    translate_zip_file, ArchiveEntry, ArchiveOptions, ArchiveReport, ZipSink,
};
use pagelingo::core::{
    print_error_message, print_info_message, DispatchOutcome, Dispatcher, DispatcherOptions,
    DocumentKind, DocumentRequest,
};
use pagelingo::env::generate_env_docs;
use pagelingo::translation::config::config_file_exists;
use pagelingo::translation::error::helpers;
use pagelingo::translation::pipeline::RuleSpec;
use pagelingo::translation::{
    load_translation_config, ConfigManager, MockGateway, OpenAiGateway, SubstitutionRules,
    TranslationConfig, TranslationGateway, TranslationResult,
};

/// 翻译 HTML 页面和脚本中的可见文本
#[derive(Parser, Debug)]
#[command(name = "pagelingo", version, about)]
#[command(long_about = "Translate the visible text of HTML pages and JavaScript/TypeScript sources \
while keeping markup, selectors, keys and URLs intact.

EXAMPLES:
    pagelingo translate index.html --lang de -o index.de.html
    pagelingo translate app.js --lang ar --rtl
    pagelingo translate site.zip --lang fr --brand Acme=Globex
    pagelingo translate ./site --lang es --dry-run
    pagelingo env
    pagelingo init-config pagelingo.toml")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate a file, a .zip archive or a directory
    Translate(TranslateArgs),

    /// Print the supported environment variables
    Env,

    /// Write an example configuration file
    InitConfig {
        /// Output path
        #[arg(default_value = "pagelingo.toml")]
        path: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input file, .zip archive or directory
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Target language code (defaults to the configured target_lang)
    #[arg(short, long)]
    lang: Option<String>,

    /// Document kind of a single file (markup or script); inferred from the extension otherwise
    #[arg(short, long)]
    kind: Option<DocumentKind>,

    /// Mark translated documents as right-to-left
    #[arg(long)]
    rtl: bool,

    /// Brand name substitution, FROM=TO
    #[arg(long, value_name = "FROM=TO", value_parser = parse_rule)]
    brand: Option<RuleSpec>,

    /// Country name substitution, FROM=TO
    #[arg(long, value_name = "FROM=TO", value_parser = parse_rule)]
    country: Option<RuleSpec>,

    /// Currency code substitution, FROM=TO
    #[arg(long, value_name = "FROM=TO", value_parser = parse_rule)]
    currency: Option<RuleSpec>,

    /// Output path; a single file is written to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List the strings that would be sent for translation without calling the API
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

fn parse_rule(value: &str) -> Result<RuleSpec, String> {
    match value.split_once('=') {
        Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
            Ok(RuleSpec::new(from.trim(), to.trim()))
        }
        _ => Err(format!("expected FROM=TO, got '{}'", value)),
    }
}

#[tokio::main]
async fn main() {
    pagelingo::utils::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Translate(args) => run_translate(args).await,
        Command::Env => {
            print!("{}", generate_env_docs());
            Ok(())
        }
        Command::InitConfig { path } => init_config(&path),
    };

    if let Err(e) = result {
        print_error_message(&format!("Error: {}", e));
        process::exit(1);
    }
}

fn init_config(path: &Path) -> TranslationResult<()> {
    if path.exists() {
        return Err(helpers::config_error(format!("{} 已存在", path.display())));
    }

    ConfigManager::generate_example_config(&path.to_string_lossy())?;
    print_info_message(&format!("已生成配置文件: {}", path.display()));
    Ok(())
}

fn load_config(path: Option<&str>) -> TranslationResult<TranslationConfig> {
    match path {
        Some(path) => Ok(ConfigManager::from_file(path)?.get_config().clone()),
        None => {
            if !config_file_exists() {
                tracing::debug!("未找到配置文件，使用默认值和环境变量");
            }
            Ok(load_translation_config())
        }
    }
}

async fn run_translate(args: TranslateArgs) -> TranslationResult<()> {
    let config = load_config(args.config.as_deref())?;
    let target_language = args.lang.clone().unwrap_or_else(|| config.target_lang.clone());

    // 试运行使用原样返回的网关并记录提交的文本
    let mock = args.dry_run.then(|| Arc::new(MockGateway::identity()));
    let gateway: Arc<dyn TranslationGateway> = match &mock {
        Some(mock) => mock.clone(),
        None => Arc::new(OpenAiGateway::from_config(&config)?),
    };
    let dispatcher = Dispatcher::new(gateway, DispatcherOptions::from_config(&config));

    let rules = SubstitutionRules {
        brand: args.brand.clone(),
        country: args.country.clone(),
        currency: args.currency.clone(),
    };

    let input = args.input.as_path();
    if input.is_dir() || is_zip(input) {
        let mut options = ArchiveOptions::new(target_language.clone());
        options.rtl = args.rtl;
        options.rules = rules;
        options.skip_bundles = config.skip_bundles;

        let report = if args.dry_run {
            // 试运行只在内存中生成结果
            let entries = if input.is_dir() {
                read_dir_tree(input)?
            } else {
                read_zip(fs::File::open(input)?)?
            };
            let mut sink = ZipSink::new(Cursor::new(Vec::new()));
            translate_entries(&dispatcher, entries, &options, &mut sink).await?
        } else if input.is_dir() {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| sibling_directory(input, &target_language));
            translate_directory(&dispatcher, input, &output, &options).await?
        } else {
            let output = args.output.clone().unwrap_or_else(|| {
                let name = input.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                input.with_file_name(output_name(&name, &target_language, None))
            });
            translate_zip_file(&dispatcher, input, &output, &options).await?
        };

        report_summary(&report);
    } else {
        let kind = args
            .kind
            .or_else(|| DocumentKind::from_path(&input.to_string_lossy()))
            .ok_or_else(|| {
                helpers::validation_error(format!(
                    "无法根据扩展名判断文档类型: {}，请使用 --kind",
                    input.display()
                ))
            })?;

        let data = fs::read(input)?;
        let path = input.to_string_lossy().to_string();
        let entry = ArchiveEntry::file(path.clone(), data);
        let text = entry
            .read_text()
            .ok_or_else(|| helpers::validation_error(format!("不是文本文件: {}", path)))?;

        let request = DocumentRequest::new(text, kind, target_language)
            .with_path(path)
            .with_rtl(args.rtl)
            .with_rules(rules);

        let outcome = dispatcher.dispatch(request).await?;
        if let DispatchOutcome::Passthrough { reason, .. } = &outcome {
            tracing::warn!("{} 原样输出: {}", input.display(), reason);
        }

        if !args.dry_run {
            write_document(args.output.as_deref(), &entry.encode_text(outcome.text()))?;
        }
    }

    if let Some(mock) = mock {
        for (_, strings) in mock.calls() {
            for text in strings {
                println!("{}", text);
            }
        }
    }

    Ok(())
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

fn sibling_directory(input: &Path, target_language: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_{}", name, target_language))
}

fn write_document(output: Option<&Path>, data: &[u8]) -> TranslationResult<()> {
    match output {
        Some(path) => {
            fs::write(path, data)?;
            print_info_message(&format!("已写入: {}", path.display()));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn report_summary(report: &ArchiveReport) {
    print_info_message(&format!(
        "共 {} 个文件: 翻译 {} 个, 原样复制 {} 个",
        report.total, report.translated, report.skipped
    ));
}
