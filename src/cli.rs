use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

use crate::config::{ChapterWindow, CrawlConfig, OutputMode};

#[derive(Parser, Debug)]
#[command(name = "nettruyen-fetch", version, about = "漫画站爬虫：下载封面、章节图片或导出 CSV")]
pub struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 只输出错误
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 爬取列表页并保存结果
    Scrape(ScrapeArgs),
}

#[derive(Args, Debug, Default)]
pub struct ScrapeArgs {
    /// JSON 配置文件，命令行参数会覆盖其中的值
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub from_page: Option<u32>,

    #[arg(long)]
    pub to_page: Option<u32>,

    /// tree: 按目录保存图片和信息；csv: 汇总为一个表格
    #[arg(long)]
    pub output: Option<OutputMode>,

    /// 章节范围 A:B（从旧到新，1 起始，包含两端）
    #[arg(long)]
    pub chapter_range: Option<ChapterWindow>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub csv_path: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<Url>,

    /// 每次请求后的等待毫秒数
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

impl ScrapeArgs {
    /// 先读配置文件（如果有），再用命令行参数覆盖
    pub fn into_config(self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::load(path)?,
            None => CrawlConfig::default(),
        };

        if let Some(from_page) = self.from_page {
            config.from_page = from_page;
        }
        if let Some(to_page) = self.to_page {
            config.to_page = to_page;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(window) = self.chapter_range {
            config.chapter_window = Some(window);
        }
        if let Some(out_dir) = self.out_dir {
            config.output_dir = out_dir;
        }
        if let Some(csv_path) = self.csv_path {
            config.csv_path = csv_path;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_delay_ms = delay_ms;
        }

        config.validate()?;
        Ok(config)
    }
}
