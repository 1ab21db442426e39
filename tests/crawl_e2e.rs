use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use url::Url;

use nettruyen_fetch::crawler::CrawlStage;
use nettruyen_fetch::error::{Result, ScrapeError};
use nettruyen_fetch::export::read_rows;
use nettruyen_fetch::models::Image;
use nettruyen_fetch::record::RecordBuilder;
use nettruyen_fetch::{
    Chapter, ChapterWindow, Comic, ComicCrawler, Count, CrawlConfig, Exporter, Fetcher, OutputMode, Page,
    TabularExporter, TreeExporter,
};

const BASE: &str = "http://comics.test/";

/// 内存中的站点，记录请求顺序
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSite {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    fn requested(&self, url: &str) -> bool {
        self.requests.lock().unwrap().iter().any(|u| u == url)
    }
}

#[async_trait]
impl Fetcher for FakeSite {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status { url: url.to_string(), status: 404 })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status { url: url.to_string(), status: 404 })
    }
}

/// 在指定的漫画或章节上模拟写盘失败，其余交给 TreeExporter
struct FailingExporter {
    inner: TreeExporter,
    fail_comic: Option<&'static str>,
    fail_chapter: Option<(&'static str, &'static str)>,
}

impl FailingExporter {
    fn new(root: &std::path::Path) -> Self {
        Self {
            inner: TreeExporter::new(root),
            fail_comic: None,
            fail_chapter: None,
        }
    }
}

fn disk_full(what: &str) -> ScrapeError {
    ScrapeError::io(what, io::Error::other("磁盘已满"))
}

impl Exporter for FailingExporter {
    fn downloads_pages(&self) -> bool {
        true
    }

    fn save_comic(&mut self, comic: &Comic, cover: Option<&Image>) -> Result<()> {
        if self.fail_comic == Some(comic.title.as_str()) {
            return Err(disk_full(&comic.title));
        }
        self.inner.save_comic(comic, cover)
    }

    fn save_page(&mut self, comic: &Comic, chapter: &Chapter, page: &Page, image: &Image) -> Result<()> {
        if self.fail_chapter == Some((comic.title.as_str(), chapter.name.as_str())) {
            return Err(disk_full(&page.id));
        }
        self.inner.save_page(comic, chapter, page, image)
    }

    fn finish(&mut self) -> Result<PathBuf> {
        self.inner.finish()
    }
}

fn card(slug: &str, title: &str, info: &str) -> String {
    format!(
        r#"<div class="item">
  <div class="image"><a href="/truyen-tranh/{slug}"><img data-original="//img.test/{slug}/cover.jpg" /></a></div>
  <div class="box_tootip">
    <div class="title">{title}</div>
    <div class="message_main">{info}</div>
    <div class="box_text">Giới thiệu {title}</div>
  </div>
</div>"#
    )
}

fn listing() -> String {
    format!(
        r#"<html><body><div class="items"><div class="row">{}{}</div></div></body></html>"#,
        card(
            "alpha",
            "Alpha",
            "\n<p>Tác giả: Jane Doe</p>\n\n<p>Tình trạng: Đang tiến hành</p>\n\n<p>Lượt xem: 1.234.567</p>\n\n<p>Ngày cập nhật: 3 giờ trước</p>\n"
        ),
        card("beta", "Beta/Gamma", "\n<p>Thể loại: Action, Drama</p>\n\n<p>Ngày cập nhật: 12/08/22</p>\n"),
    )
}

fn chapter_list(slug: &str, count: usize) -> String {
    let rows: String = (1..=count)
        .rev()
        .map(|n| {
            format!(r#"<li class="row"><div class="chapter"><a href="/truyen-tranh/{slug}/chap-{n}">Chapter {n}</a></div></li>"#)
        })
        .collect();
    format!(r#"<html><body><div class="list-chapter"><ul>{rows}</ul></div></body></html>"#)
}

fn chapter_pages(slug: &str, chapter: usize) -> String {
    format!(
        r#"<div class="reading-detail">
  <div id="page_1" class="page-chapter"><img data-original="//img.test/{slug}/{chapter}/1.jpg" /></div>
  <div id="page_2" class="page-chapter"><img data-original="//img.test/{slug}/{chapter}/2.jpg" /></div>
</div>"#
    )
}

fn site() -> FakeSite {
    let mut site = FakeSite::default()
        .page("http://comics.test/?page=1", &listing())
        .page("http://comics.test/truyen-tranh/alpha", &chapter_list("alpha", 3))
        .page("http://comics.test/truyen-tranh/beta", &chapter_list("beta", 2))
        .image("https://img.test/alpha/cover.jpg", b"alpha-cover")
        .image("https://img.test/beta/cover.jpg", b"beta-cover");

    for (slug, chapters) in [("alpha", 3), ("beta", 2)] {
        for n in 1..=chapters {
            site = site.page(&format!("http://comics.test/truyen-tranh/{slug}/chap-{n}"), &chapter_pages(slug, n));
            for p in 1..=2 {
                site = site.image(&format!("https://img.test/{slug}/{n}/{p}.jpg"), format!("{slug}-{n}-{p}").as_bytes());
            }
        }
    }
    site
}

fn config(output: OutputMode, window: Option<ChapterWindow>) -> CrawlConfig {
    CrawlConfig {
        base_url: Url::parse(BASE).unwrap(),
        chapter_window: window,
        output,
        request_delay_ms: 0,
        ..Default::default()
    }
}

fn fixed_clock() -> RecordBuilder {
    RecordBuilder::new(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap(),
    )
}

#[tokio::test]
async fn tree_export_downloads_windowed_chapters() {
    let dir = tempfile::tempdir().unwrap();
    let crawler = ComicCrawler::new(site(), config(OutputMode::Tree, ChapterWindow::new(2, 3).ok()))
        .with_builder(fixed_clock());
    let mut exporter = TreeExporter::new(dir.path());

    let report = crawler.crawl(&mut exporter).await.unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    let titles: Vec<&str> = report.comics.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta/Gamma"]);

    let alpha = &report.comics[0];
    assert_eq!(alpha.author, "Jane Doe");
    assert_eq!(alpha.n_views, Count::Known(1_234_567));
    assert_eq!(alpha.n_follows, Count::Unknown);
    assert_eq!(alpha.last_update_date, NaiveDate::from_ymd_opt(2023, 12, 31));
    assert_eq!(alpha.latest_chapter.as_deref(), Some("Chapter 3"));
    let names: Vec<&str> = alpha.chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chapter 2", "Chapter 3"]);
    assert_eq!(alpha.chapters[0].pages.len(), 2);

    let beta = &report.comics[1];
    assert_eq!(beta.author, "Unknown");
    assert_eq!(beta.last_update_date, NaiveDate::from_ymd_opt(2022, 8, 12));
    let names: Vec<&str> = beta.chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chapter 2"]);

    let alpha_dir = dir.path().join("Alpha");
    assert_eq!(fs::read(alpha_dir.join("cover.jpg")).unwrap(), b"alpha-cover");
    assert!(fs::read_to_string(alpha_dir.join("info.txt")).unwrap().contains("Author: Jane Doe"));
    assert_eq!(fs::read(alpha_dir.join("Chapter 2").join("page_1.jpg")).unwrap(), b"alpha-2-1");
    assert_eq!(fs::read(alpha_dir.join("Chapter 3").join("page_2.jpg")).unwrap(), b"alpha-3-2");
    assert!(!alpha_dir.join("Chapter 1").exists());
    assert_eq!(fs::read(dir.path().join("Beta_Gamma").join("Chapter 2").join("page_2.jpg")).unwrap(), b"beta-2-2");
}

#[tokio::test]
async fn csv_export_skips_images() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("comics.csv");
    let site = site();
    let crawler = ComicCrawler::new(site, config(OutputMode::Csv, None)).with_builder(fixed_clock());
    let mut exporter = TabularExporter::new(&csv_path);

    let report = crawler.crawl(&mut exporter).await.unwrap();
    assert_eq!(report.comics.len(), 2);
    assert_eq!(report.output.as_deref(), Some(csv_path.as_path()));

    let rows = read_rows(&csv_path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].title, "Alpha");
    assert_eq!(rows[0].views, Count::Known(1_234_567));
    assert_eq!(rows[0].last_update, "31/12/2023");
    assert_eq!(rows[0].latest_chapter, "Chapter 3");
    assert_eq!(rows[1].categories, "Action, Drama");
    assert_eq!(rows[1].views, Count::Unknown);
    assert_eq!(rows[1].latest_chapter, "Chapter 2");

    // 所有章节仍按时间正序收集
    let names: Vec<&str> = report.comics[0].chapters.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Chapter 1", "Chapter 2", "Chapter 3"]);
    assert!(report.comics[0].chapters.iter().all(|c| c.pages.is_empty()));
}

#[tokio::test]
async fn chapter_failure_only_stops_that_comic() {
    let dir = tempfile::tempdir().unwrap();
    let mut site = site();
    site.pages.remove("http://comics.test/truyen-tranh/alpha/chap-2");
    site.images.remove("https://img.test/beta/1/1.jpg");
    let crawler = ComicCrawler::new(site, config(OutputMode::Tree, None)).with_builder(fixed_clock());
    let mut exporter = TreeExporter::new(dir.path());

    let report = crawler.crawl(&mut exporter).await.unwrap();

    assert_eq!(report.comics.len(), 2);
    let stages: Vec<CrawlStage> = report.failures.iter().map(|f| f.stage).collect();
    assert_eq!(stages, vec![CrawlStage::Chapter(1), CrawlStage::Page(0, 0)]);
    assert_eq!(report.failures[0].link, "http://comics.test/truyen-tranh/alpha");

    let alpha_dir = dir.path().join("Alpha");
    assert!(alpha_dir.join("Chapter 1").join("page_1.jpg").exists());
    assert!(!alpha_dir.join("Chapter 3").exists());

    let beta_dir = dir.path().join("Beta_Gamma");
    assert!(!beta_dir.join("Chapter 1").join("page_1.jpg").exists());
    assert!(beta_dir.join("Chapter 1").join("page_2.jpg").exists());
    assert!(beta_dir.join("Chapter 2").join("page_1.jpg").exists());
}

#[tokio::test]
async fn missing_chapter_list_keeps_comic() {
    let dir = tempfile::tempdir().unwrap();
    let mut site = site();
    site.pages.remove("http://comics.test/truyen-tranh/beta");
    let crawler = ComicCrawler::new(site, config(OutputMode::Tree, None)).with_builder(fixed_clock());
    let mut exporter = TreeExporter::new(dir.path());

    let report = crawler.crawl(&mut exporter).await.unwrap();
    assert_eq!(report.comics.len(), 2);
    assert!(report.comics[1].chapters.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, CrawlStage::Chapters);
    assert!(dir.path().join("Beta_Gamma").join("info.txt").exists());
}

#[tokio::test]
async fn bad_comic_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let listing = listing().replace("Lượt xem: 1.234.567", "Lượt xem: nhiều");
    let site = site().page("http://comics.test/?page=1", &listing);
    let crawler = ComicCrawler::new(site, config(OutputMode::Tree, None)).with_builder(fixed_clock());
    let mut exporter = TreeExporter::new(dir.path());

    let report = crawler.crawl(&mut exporter).await.unwrap();
    let titles: Vec<&str> = report.comics.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Beta/Gamma"]);
    assert_eq!(report.failures[0].stage, CrawlStage::Comic);
    assert!(report.failures[0].error.contains("Lượt xem"));
    assert!(!dir.path().join("Alpha").exists());
}

#[tokio::test]
async fn listing_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let site = FakeSite::default();
    let crawler = ComicCrawler::new(site, config(OutputMode::Tree, None));
    let mut exporter = TreeExporter::new(dir.path());

    let err = crawler.crawl(&mut exporter).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
}

#[tokio::test]
async fn requests_follow_site_order() {
    let dir = tempfile::tempdir().unwrap();
    let crawler = ComicCrawler::new(site(), config(OutputMode::Csv, None)).with_builder(fixed_clock());
    let mut exporter = TabularExporter::new(dir.path().join("comics.csv"));
    crawler.crawl(&mut exporter).await.unwrap();

    let requests = crawler.fetcher().requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            "http://comics.test/?page=1",
            "http://comics.test/truyen-tranh/alpha",
            "http://comics.test/truyen-tranh/beta",
        ]
    );
    assert!(!crawler.fetcher().requested("https://img.test/alpha/cover.jpg"));
    assert_eq!(exporter.rows().len(), 2);
}

#[tokio::test]
async fn page_write_failure_stops_that_comic_only() {
    let dir = tempfile::tempdir().unwrap();
    let crawler = ComicCrawler::new(site(), config(OutputMode::Tree, None)).with_builder(fixed_clock());
    let mut exporter = FailingExporter::new(dir.path());
    exporter.fail_chapter = Some(("Alpha", "Chapter 2"));

    let report = crawler.crawl(&mut exporter).await.unwrap();

    assert_eq!(report.comics.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, CrawlStage::Page(1, 0));
    assert_eq!(report.failures[0].link, "http://comics.test/truyen-tranh/alpha");

    let alpha_dir = dir.path().join("Alpha");
    assert!(alpha_dir.join("Chapter 1").join("page_2.jpg").exists());
    assert!(!alpha_dir.join("Chapter 2").join("page_2.jpg").exists());
    assert!(!alpha_dir.join("Chapter 3").exists());
    assert!(!crawler.fetcher().requested("http://comics.test/truyen-tranh/alpha/chap-3"));

    let beta_dir = dir.path().join("Beta_Gamma");
    assert!(beta_dir.join("Chapter 1").join("page_1.jpg").exists());
    assert!(beta_dir.join("Chapter 2").join("page_2.jpg").exists());
}

#[tokio::test]
async fn comic_write_failure_skips_comic_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let crawler = ComicCrawler::new(site(), config(OutputMode::Tree, None)).with_builder(fixed_clock());
    let mut exporter = FailingExporter::new(dir.path());
    exporter.fail_comic = Some("Alpha");

    let report = crawler.crawl(&mut exporter).await.unwrap();

    let titles: Vec<&str> = report.comics.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Beta/Gamma"]);
    let stages: Vec<CrawlStage> = report.failures.iter().map(|f| f.stage).collect();
    assert_eq!(stages, vec![CrawlStage::Comic]);
    assert!(report.failures[0].error.contains("磁盘已满"));

    assert!(!dir.path().join("Alpha").exists());
    assert!(!crawler.fetcher().requested("http://comics.test/truyen-tranh/alpha/chap-1"));
    assert!(dir.path().join("Beta_Gamma").join("Chapter 2").join("page_1.jpg").exists());
}
