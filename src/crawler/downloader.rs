use crate::crawler::fetcher::Fetcher;
use crate::error::Result;
use crate::models::{Comic, Image, Page};
use crate::utils::image_extension;

pub struct ImageDownloader<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: Fetcher + ?Sized> ImageDownloader<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// 通用的图片下载函数
    pub async fn download_image(&self, image_url: &str) -> Result<Image> {
        let bytes = self.fetcher.fetch_image(image_url).await?;
        Ok(Image {
            bytes,
            extension: image_extension(image_url),
        })
    }

    /// 没有封面地址时返回 `Ok(None)`
    pub async fn download_cover(&self, comic: &Comic) -> Result<Option<Image>> {
        match comic.cover_url.as_deref() {
            Some(cover_url) => self.download_image(cover_url).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn download_page(&self, page: &Page) -> Result<Image> {
        self.download_image(&page.image_url).await
    }
}
