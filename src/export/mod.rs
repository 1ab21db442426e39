pub mod tabular;
pub mod tree;

pub use tabular::{ComicRow, TabularExporter, read_rows};
pub use tree::TreeExporter;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CrawlConfig, OutputMode};
use crate::error::{Result, ScrapeError};
use crate::models::{Chapter, Comic, Image, Page};

/// 爬取结果的保存方式
pub trait Exporter {
    /// 是否需要下载章节图片
    fn downloads_pages(&self) -> bool;

    fn save_comic(&mut self, comic: &Comic, cover: Option<&Image>) -> Result<()>;

    fn save_page(&mut self, comic: &Comic, chapter: &Chapter, page: &Page, image: &Image) -> Result<()>;

    /// 全部漫画处理完后调用，返回生成的文件或目录
    fn finish(&mut self) -> Result<PathBuf>;
}

pub fn exporter_for(config: &CrawlConfig) -> Box<dyn Exporter> {
    match config.output {
        OutputMode::Tree => Box::new(TreeExporter::new(&config.output_dir)),
        OutputMode::Csv => Box::new(TabularExporter::new(&config.csv_path)),
    }
}

/// 先写到 `<文件名>.part`，成功后再改名，避免留下半截文件
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let result = fs::write(&partial, contents)
        .map_err(|e| ScrapeError::io(&partial, e))
        .and_then(|()| fs::rename(&partial, path).map_err(|e| ScrapeError::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}
