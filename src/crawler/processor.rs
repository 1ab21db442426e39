use super::downloader::ImageDownloader;
use super::fetcher::Fetcher;
use super::parser::ComicParser;
use super::{CrawlStage, Failure};
use crate::export::Exporter;
use crate::models::Comic;

/// 逐章获取页面列表并下载图片
pub struct ChapterProcessor<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    parser: &'a ComicParser,
}

impl<'a, F: Fetcher + ?Sized> ChapterProcessor<'a, F> {
    pub fn new(fetcher: &'a F, parser: &'a ComicParser) -> Self {
        Self { fetcher, parser }
    }

    /// 某一章失败后，这部漫画剩下的章节不再处理；单页下载失败只跳过该页。
    /// 返回保存成功的页数
    pub async fn fetch_and_process_chapters(
        &self,
        comic: &mut Comic,
        exporter: &mut dyn Exporter,
        failures: &mut Vec<Failure>,
    ) -> usize {
        let downloader = ImageDownloader::new(self.fetcher);
        let mut saved = 0;

        for chapter_index in 0..comic.chapters.len() {
            let chapter_url = comic.chapters[chapter_index].url.clone();
            log::info!("正在处理《{}》{}", comic.title, comic.chapters[chapter_index].name);

            let html_content = match self.fetcher.fetch_text(&chapter_url).await {
                Ok(html) => html,
                Err(e) => {
                    log::error!("获取章节失败，跳过《{}》剩余章节 ({}): {}", comic.title, comic.url, e);
                    failures.push(Failure::new(&comic.url, CrawlStage::Chapter(chapter_index), &e));
                    return saved;
                }
            };

            let pages = self.parser.parse_pages(&html_content);
            if pages.is_empty() {
                log::warn!("章节 '{}' 没有找到图片", comic.chapters[chapter_index].name);
            }
            comic.chapters[chapter_index].pages = pages;

            let chapter = &comic.chapters[chapter_index];
            for (page_index, page) in chapter.pages.iter().enumerate() {
                let stage = CrawlStage::Page(chapter_index, page_index);
                let image = match downloader.download_page(page).await {
                    Ok(image) => image,
                    Err(e) => {
                        log::warn!("下载图片失败 {}: {}", page.image_url, e);
                        failures.push(Failure::new(&page.image_url, stage, &e));
                        continue;
                    }
                };

                if let Err(e) = exporter.save_page(comic, chapter, page, &image) {
                    log::error!("保存图片失败，跳过《{}》剩余章节: {}", comic.title, e);
                    failures.push(Failure::new(&comic.url, stage, &e));
                    return saved;
                }
                saved += 1;
            }
        }

        saved
    }
}
