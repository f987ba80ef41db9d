//! techdetector 命令行入口
//! 抓取页面（或读取本地HTML）后运行检测，输出分组文本或 JSON

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use techdetector::service::ensure_allowed;
use techdetector::{render_text, ConfigManager, PageFetcher, TechDetector};

/// 本地HTML文件未指定URL时使用的页面地址
const LOCAL_PAGE_URL: &str = "http://localhost/";

#[derive(Debug, Parser)]
#[command(name = "techdetector", version, about = "Detect web technologies used by a page")]
struct Cli {
    /// 页面URL
    url: Option<String>,

    /// 读取本地HTML文件而不是抓取URL
    #[arg(long, value_name = "PATH")]
    html_file: Option<PathBuf>,

    /// 以 JSON 输出检测结果
    #[arg(long)]
    json: bool,

    /// 自定义签名目录（JSON）
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// HTTP 超时（秒）
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("初始化日志失败：{}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose)?;

    let mut builder = ConfigManager::custom().http_timeout(cli.timeout).verbose(cli.verbose);
    if let Some(path) = cli.catalog.clone() {
        builder = builder.catalog_path(path);
    }
    let config = builder.build();

    let (url, html) = match (&cli.html_file, &cli.url) {
        (Some(path), url) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("读取HTML文件失败：{}", path.display()))?;
            (url.clone().unwrap_or_else(|| LOCAL_PAGE_URL.to_string()), html)
        }
        (None, Some(url)) => {
            ensure_allowed(url)?;
            let page = PageFetcher::new(&config)?
                .fetch(url)
                .await
                .with_context(|| format!("抓取页面失败：{}", url))?;
            (page.final_url, page.body)
        }
        (None, None) => bail!("请提供页面URL或 --html-file"),
    };

    let detector = TechDetector::new(config).await.context("加载签名目录失败")?;
    let results = detector.detect_html(&url, &html)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{}", url);
        println!();
        print!("{}", render_text(&results));
        if results.is_empty() {
            println!();
        }
    }
    Ok(())
}
