use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::ParseError;
use crate::models::{Chapter, Page};
use crate::utils::resolve_url;

const ITEMS: &str = "div.items";
const ITEM: &str = ".item";
const TITLE: &str = ".title";
const INTRODUCTION: &str = ".box_text";
const INFO_BLOCK: &str = ".message_main";
const COVER_IMG: &str = "img[data-original]";
const COMIC_LINK: &str = ".image > a";
const CHAPTER_LIST: &str = ".list-chapter";
const CHAPTER_ROW: &str = "li.row";
const LINK: &str = "a";
const PAGE: &str = ".page-chapter";
const IMG: &str = "img";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("内置选择器应当合法")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

fn first<'a>(element: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>, ParseError> {
    element
        .select(&selector(css))
        .next()
        .ok_or_else(|| ParseError::missing(css))
}

/// 列表页上单个漫画卡片的原始内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicCard {
    pub title: String,
    pub introduction: String,
    pub raw_info: String,
    pub cover_url: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct ComicParser {
    base_url: Url,
}

impl ComicParser {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// 列表页缺少 `div.items` 时返回错误；单个卡片解析失败只影响该卡片
    pub fn parse_listing(&self, html_content: &str) -> Result<Vec<Result<ComicCard, ParseError>>, ParseError> {
        let document = Html::parse_document(html_content);
        let items = document
            .select(&selector(ITEMS))
            .next()
            .ok_or_else(|| ParseError::missing(ITEMS))?;

        Ok(items
            .select(&selector(ITEM))
            .map(|card| self.parse_card(card))
            .collect())
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Result<ComicCard, ParseError> {
        let title = text_of(first(card, TITLE)?).trim().to_string();
        let introduction = text_of(first(card, INTRODUCTION)?);
        let raw_info = text_of(first(card, INFO_BLOCK)?);

        let cover_url = card
            .select(&selector(COVER_IMG))
            .next()
            .and_then(|img| img.value().attr("data-original"))
            .and_then(|src| resolve_url(&self.base_url, src));

        let link = first(card, COMIC_LINK)?
            .value()
            .attr("href")
            .and_then(|href| resolve_url(&self.base_url, href))
            .ok_or_else(|| ParseError::missing_attr("href", COMIC_LINK))?;

        Ok(ComicCard {
            title,
            introduction,
            raw_info,
            cover_url,
            link,
        })
    }

    /// 章节列表，保持站点顺序（最新的在前）
    pub fn parse_chapter_list(&self, html_content: &str) -> Result<Vec<Chapter>, ParseError> {
        let document = Html::parse_document(html_content);
        let list = document
            .select(&selector(CHAPTER_LIST))
            .next()
            .ok_or_else(|| ParseError::missing(CHAPTER_LIST))?;

        let link_selector = selector(LINK);
        let mut chapters = Vec::new();
        for row in list.select(&selector(CHAPTER_ROW)) {
            let Some(link) = row.select(&link_selector).next() else {
                log::warn!("章节行缺少链接，已跳过");
                continue;
            };
            let name = text_of(link).trim().to_string();
            let url = link
                .value()
                .attr("href")
                .and_then(|href| resolve_url(&self.base_url, href))
                .filter(|_| !name.is_empty());
            let Some(url) = url else {
                log::warn!("章节 '{}' 缺少名称或链接，已跳过", name);
                continue;
            };
            chapters.push(Chapter::new(name, url));
        }

        Ok(chapters)
    }

    pub fn parse_pages(&self, html_content: &str) -> Vec<Page> {
        let document = Html::parse_document(html_content);
        let img_selector = selector(IMG);
        let mut pages = Vec::new();

        for (index, page) in document.select(&selector(PAGE)).enumerate() {
            let src = page
                .select(&img_selector)
                .next()
                .and_then(|img| img.value().attr("data-original").or_else(|| img.value().attr("src")))
                .and_then(|src| resolve_url(&self.base_url, src));

            let Some(image_url) = src else {
                log::warn!("第 {} 页没有图片地址，已跳过", index + 1);
                continue;
            };

            let id = page
                .value()
                .attr("id")
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("page_{:03}", index + 1));

            pages.push(Page { id, image_url });
        }

        pages
    }
}
