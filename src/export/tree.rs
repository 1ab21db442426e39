use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Exporter, write_atomic};
use crate::error::{Result, ScrapeError};
use crate::models::{Chapter, Comic, Image, Page};
use crate::utils::sanitize_path_component;

/// 目录结构:
///
/// ```text
/// <root>/<漫画标题>/cover.<ext>
/// <root>/<漫画标题>/info.txt
/// <root>/<漫画标题>/<章节名>/<页面id>.<ext>
/// ```
///
/// 不同标题清理后可能得到同一个目录名，后来的漫画改用 `<目录名> (2)`、`(3)` ...
pub struct TreeExporter {
    root: PathBuf,
    dirs: HashMap<String, PathBuf>, // 本次运行中 标题 -> 目录
}

impl TreeExporter {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            dirs: HashMap::new(),
        }
    }

    pub fn comic_dir(&mut self, comic: &Comic) -> PathBuf {
        if let Some(dir) = self.dirs.get(&comic.title) {
            return dir.clone();
        }

        let name = sanitize_path_component(&comic.title);
        let mut dir = self.root.join(&name);
        let mut n = 2;
        while self.dirs.values().any(|used| *used == dir) {
            dir = self.root.join(format!("{} ({})", name, n));
            n += 1;
        }
        if n > 2 {
            log::warn!("《{}》的目录名与其他漫画重复，改为保存到: {}", comic.title, dir.display());
        }

        self.dirs.insert(comic.title.clone(), dir.clone());
        dir
    }

    pub fn chapter_dir(&mut self, comic: &Comic, chapter: &Chapter) -> PathBuf {
        self.comic_dir(comic).join(sanitize_path_component(&chapter.name))
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))
}

impl Exporter for TreeExporter {
    fn downloads_pages(&self) -> bool {
        true
    }

    fn save_comic(&mut self, comic: &Comic, cover: Option<&Image>) -> Result<()> {
        let comic_dir = self.comic_dir(comic);
        create_dir(&comic_dir)?;

        if let Some(cover) = cover {
            let cover_path = comic_dir.join(format!("cover.{}", cover.extension));
            write_atomic(&cover_path, &cover.bytes)?;
            log::debug!("封面已保存到: {}", cover_path.display());
        }

        let info_path = comic_dir.join("info.txt");
        write_atomic(&info_path, comic.to_string().as_bytes())?;
        log::info!("《{}》信息已保存到: {}", comic.title, comic_dir.display());
        Ok(())
    }

    fn save_page(&mut self, comic: &Comic, chapter: &Chapter, page: &Page, image: &Image) -> Result<()> {
        let chapter_dir = self.chapter_dir(comic, chapter);
        create_dir(&chapter_dir)?;

        let filename = format!("{}.{}", sanitize_path_component(&page.id), image.extension);
        let page_path = chapter_dir.join(filename);
        write_atomic(&page_path, &image.bytes)?;
        log::debug!("图片已保存到: {}", page_path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<PathBuf> {
        Ok(self.root.clone())
    }
}
