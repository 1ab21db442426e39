use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::{Exporter, write_atomic};
use crate::error::{Result, ScrapeError};
use crate::models::{Chapter, Comic, Count, Image, Page};

/// CSV 中的一行，列顺序即表头顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComicRow {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Categories")]
    pub categories: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Views")]
    pub views: Count,
    #[serde(rename = "Comments")]
    pub comments: Count,
    #[serde(rename = "Follows")]
    pub follows: Count,
    #[serde(rename = "Introduction")]
    pub introduction: String,
    #[serde(rename = "Last Update")]
    pub last_update: String,
    #[serde(rename = "Latest Chapter")]
    pub latest_chapter: String,
}

impl From<&Comic> for ComicRow {
    fn from(comic: &Comic) -> Self {
        Self {
            title: comic.title.clone(),
            categories: comic.categories.clone().unwrap_or_default(),
            status: comic.status.clone().unwrap_or_default(),
            views: comic.n_views,
            comments: comic.n_comments,
            follows: comic.n_follows,
            introduction: comic.introduction.clone(),
            last_update: comic.last_update_text(),
            latest_chapter: comic.latest_chapter.clone().unwrap_or_default(),
        }
    }
}

/// 把所有漫画汇总成一个 CSV 文件，最后一次性写出
pub struct TabularExporter {
    path: PathBuf,
    rows: Vec<ComicRow>,
}

impl TabularExporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[ComicRow] {
        &self.rows
    }

    pub fn to_csv(&self) -> std::result::Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.rows.is_empty() {
            writer.write_record(HEADERS)?;
        }
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }
}

pub const HEADERS: [&str; 9] = [
    "Title",
    "Categories",
    "Status",
    "Views",
    "Comments",
    "Follows",
    "Introduction",
    "Last Update",
    "Latest Chapter",
];

impl Exporter for TabularExporter {
    fn downloads_pages(&self) -> bool {
        false
    }

    fn save_comic(&mut self, comic: &Comic, _cover: Option<&Image>) -> Result<()> {
        self.rows.push(ComicRow::from(comic));
        Ok(())
    }

    fn save_page(&mut self, _comic: &Comic, _chapter: &Chapter, _page: &Page, _image: &Image) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<PathBuf> {
        let contents = self.to_csv().map_err(|e| ScrapeError::io(&self.path, e.into()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScrapeError::io(parent, e))?;
        }
        write_atomic(&self.path, &contents)?;
        log::info!("已写入 {} 行到 {}", self.rows.len(), self.path.display());
        Ok(self.path.clone())
    }
}

/// 读取导出的 CSV
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<ComicRow>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for row in reader.deserialize::<ComicRow>() {
        rows.push(row?);
    }
    Ok(rows)
}
