use anyhow::{Context, Result};
use clap::Parser;
use nettruyen_fetch::cli::{Cli, Command};
use nettruyen_fetch::export::exporter_for;
use nettruyen_fetch::{ComicCrawler, CrawlReport, HttpFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level())).init();

    match cli.command {
        Command::Scrape(args) => {
            let config = args.into_config()?;
            let fetcher = HttpFetcher::new(&config).context("创建 HTTP 客户端失败")?;
            let mut exporter = exporter_for(&config);
            let crawler = ComicCrawler::new(fetcher, config);

            let report = crawler.crawl(exporter.as_mut()).await?;
            print_summary(&report);
        }
    }

    Ok(())
}

fn print_summary(report: &CrawlReport) {
    println!("\n=== 爬取完成 ===");
    println!("漫画: {} 部", report.comics.len());
    for comic in &report.comics {
        let pages: usize = comic.chapters.iter().map(|c| c.pages.len()).sum();
        println!("  ├── {} ({} 章, {} 页)", comic.title, comic.chapters.len(), pages);
    }
    if let Some(output) = &report.output {
        println!("输出: {}", output.display());
    }
    if !report.failures.is_empty() {
        println!("失败 {} 项:", report.failures.len());
        for failure in &report.failures {
            println!("  {} [{}]: {}", failure.link, failure.stage, failure.error);
        }
    }
    println!("==============\n");
}
