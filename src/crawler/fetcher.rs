use async_trait::async_trait;
use reqwest::header::{REFERER, USER_AGENT};
use std::time::Duration;

use crate::config::CrawlConfig;
use crate::error::{Result, ScrapeError};

/// 抓取网页和图片的接口，测试时可以替换成内存实现
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
    image_user_agent: String,
    referer: String,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            delay: Duration::from_millis(config.request_delay_ms),
            image_user_agent: config.image_user_agent.clone(),
            referer: config.referer().to_string(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let response = request.send().await.map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;

        // 避免请求过快
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        log::debug!("正在获取: {}", url);
        let response = self.send(self.client.get(url), url).await?;
        response.text().await.map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("正在下载图片: {}", url);
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, self.image_user_agent.as_str())
            .header(REFERER, self.referer.as_str());
        let response = self.send(request, url).await?;
        let bytes = response.bytes().await.map_err(|source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}
