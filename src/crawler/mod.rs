pub mod downloader;
pub mod fetcher;
pub mod parser;
pub mod processor;

pub use downloader::ImageDownloader;
pub use fetcher::{Fetcher, HttpFetcher};
pub use parser::{ComicCard, ComicParser};
pub use processor::ChapterProcessor;

use std::fmt;
use std::path::PathBuf;

use crate::config::{ChapterWindow, CrawlConfig};
use crate::error::Result;
use crate::export::Exporter;
use crate::models::{Chapter, Comic};
use crate::record::{RecordBuilder, parse_info_block};

/// 出错时所处的步骤，章节和页面从 0 开始编号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStage {
    Listing(u32),
    Comic,
    Cover,
    Chapters,
    Chapter(usize),
    Page(usize, usize),
}

impl fmt::Display for CrawlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlStage::Listing(page) => write!(f, "列表第 {} 页", page),
            CrawlStage::Comic => f.write_str("漫画信息"),
            CrawlStage::Cover => f.write_str("封面"),
            CrawlStage::Chapters => f.write_str("章节列表"),
            CrawlStage::Chapter(i) => write!(f, "第 {} 章", i + 1),
            CrawlStage::Page(i, j) => write!(f, "第 {} 章第 {} 页", i + 1, j + 1),
        }
    }
}

/// 一次不致命的失败，记录后继续
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub link: String,
    pub stage: CrawlStage,
    pub error: String,
}

impl Failure {
    pub fn new(link: &str, stage: CrawlStage, error: &impl fmt::Display) -> Self {
        Self {
            link: link.to_string(),
            stage,
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub comics: Vec<Comic>,
    pub failures: Vec<Failure>,
    pub output: Option<PathBuf>,
}

/// 站点按从新到旧列出章节：先反转成时间正序，再取窗口
pub fn select_chapters(site_order: Vec<Chapter>, window: Option<ChapterWindow>) -> Vec<Chapter> {
    let mut chapters = site_order;
    chapters.reverse();
    match window {
        Some(window) => window.apply(chapters),
        None => chapters,
    }
}

pub struct ComicCrawler<F: Fetcher> {
    fetcher: F,
    parser: ComicParser,
    builder: RecordBuilder,
    config: CrawlConfig,
}

impl<F: Fetcher> ComicCrawler<F> {
    pub fn new(fetcher: F, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            parser: ComicParser::new(config.base_url.clone()),
            builder: RecordBuilder::now(),
            config,
        }
    }

    /// 固定"当前时间"，用于换算相对更新时间
    pub fn with_builder(mut self, builder: RecordBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 列表页获取或解析失败会直接返回错误；单部漫画的失败记录在报告里
    pub async fn crawl(&self, exporter: &mut dyn Exporter) -> Result<CrawlReport> {
        let mut report = CrawlReport::default();
        let mut cards = Vec::new();

        for page in self.config.from_page..=self.config.to_page {
            let url = self.config.listing_url(page);
            log::info!("正在获取列表第 {} 页: {}", page, url);

            let html_content = self.fetcher.fetch_text(&url).await?;
            for card in self.parser.parse_listing(&html_content)? {
                match card {
                    Ok(card) => cards.push(card),
                    Err(e) => {
                        log::warn!("列表第 {} 页有漫画无法解析: {}", page, e);
                        report.failures.push(Failure::new(&url, CrawlStage::Listing(page), &e));
                    }
                }
            }
        }

        log::info!("共找到 {} 部漫画", cards.len());

        for card in &cards {
            match self.scrape_comic(card, exporter, &mut report.failures).await {
                Ok(comic) => report.comics.push(comic),
                Err(e) => {
                    log::error!("爬取漫画失败 {}: {}", card.link, e);
                    report.failures.push(Failure::new(&card.link, CrawlStage::Comic, &e));
                }
            }
        }

        report.output = Some(exporter.finish()?);
        Ok(report)
    }

    async fn scrape_comic(
        &self,
        card: &ComicCard,
        exporter: &mut dyn Exporter,
        failures: &mut Vec<Failure>,
    ) -> Result<Comic> {
        let info = parse_info_block(&card.raw_info);
        let mut comic = self
            .builder
            .build(&card.title, &card.introduction, &info, card.cover_url.clone(), Vec::new())?;
        comic.url = card.link.clone();
        log::info!("正在爬取《{}》", comic.title);

        match self.fetch_chapter_list(&card.link).await {
            Ok(site_order) => {
                comic.latest_chapter = site_order.first().map(|c| c.name.clone());
                comic.add_chapters(select_chapters(site_order, self.config.chapter_window));
                log::debug!("《{}》选中 {} 个章节", comic.title, comic.chapters.len());
            }
            Err(e) => {
                log::warn!("获取章节列表失败 {}: {}", card.link, e);
                failures.push(Failure::new(&card.link, CrawlStage::Chapters, &e));
            }
        }

        let mut cover = None;
        if exporter.downloads_pages() {
            match ImageDownloader::new(&self.fetcher).download_cover(&comic).await {
                Ok(image) => cover = image,
                Err(e) => {
                    log::warn!("下载《{}》封面失败: {}", comic.title, e);
                    failures.push(Failure::new(&card.link, CrawlStage::Cover, &e));
                }
            }
        }

        exporter.save_comic(&comic, cover.as_ref())?;

        if exporter.downloads_pages() {
            let processor = ChapterProcessor::new(&self.fetcher, &self.parser);
            let saved = processor
                .fetch_and_process_chapters(&mut comic, exporter, failures)
                .await;
            log::info!("《{}》共保存 {} 张图片", comic.title, saved);
        }

        Ok(comic)
    }

    async fn fetch_chapter_list(&self, comic_link: &str) -> Result<Vec<Chapter>> {
        let html_content = self.fetcher.fetch_text(comic_link).await?;
        Ok(self.parser.parse_chapter_list(&html_content)?)
    }
}
