//! Web 服务器主程序入口

#[cfg(feature = "web")]
use std::sync::Arc;

#[cfg(feature = "web")]
use pagelingo::core::{Dispatcher, DispatcherOptions};
#[cfg(feature = "web")]
use pagelingo::translation::{load_translation_config, OpenAiGateway};
#[cfg(feature = "web")]
use pagelingo::web::{AppState, WebConfig, WebServer};

#[cfg(feature = "web")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pagelingo::utils::init_tracing();

    // 环境变量提供默认值，命令行参数覆盖
    let mut web_config = WebConfig::default();

    // 简单的命令行参数解析
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    web_config.bind_addr = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --bind requires an address");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    web_config.port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: Invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Error: Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    let server = WebServer::new(web_config, build_state());
    server.start().await?;

    Ok(())
}

/// 根据配置创建应用状态，缺少凭据时服务仍然启动
#[cfg(feature = "web")]
fn build_state() -> AppState {
    let config = load_translation_config();

    match OpenAiGateway::from_config(&config) {
        Ok(gateway) => {
            tracing::info!("翻译模型: {} ({})", config.model, config.api_base_url);
            let dispatcher = Dispatcher::new(Arc::new(gateway), DispatcherOptions::from_config(&config));
            AppState::new(Arc::new(dispatcher))
        }
        Err(e) => {
            tracing::warn!("翻译网关不可用: {}", e);
            AppState::unconfigured()
        }
    }
}

#[cfg(feature = "web")]
fn print_help() {
    println!("Pagelingo Web Server");
    println!();
    println!("USAGE:");
    println!("    pagelingo-web [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -b, --bind <ADDRESS>     Bind address [default: 127.0.0.1]");
    println!("    -p, --port <PORT>        Port number [default: 7080]");
    println!("    -h, --help               Print help information");
    println!();
    println!("ENDPOINTS:");
    println!("    POST /api/translate            {{html, targetLang, rtl?, rules?, filePath?}}");
    println!("    POST /api/translate-js         {{code, targetLang, filename?}}");
    println!("    POST /api/translate-document   {{documentText, documentKind, targetLanguage}}");
    println!("    GET  /health");
    println!();
    println!("EXAMPLES:");
    println!("    pagelingo-web");
    println!("    pagelingo-web --bind 0.0.0.0 --port 3000");
}

#[cfg(not(feature = "web"))]
fn main() {
    eprintln!("Error: Web feature not enabled. Please compile with --features web");
    std::process::exit(1);
}
