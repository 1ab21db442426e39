use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://www.nettruyenco.com/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_IMAGE_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/101.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Tree,
    Csv,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputMode::Tree),
            "csv" => Ok(OutputMode::Csv),
            other => Err(format!("未知的输出格式: {} (可选 tree 或 csv)", other)),
        }
    }
}

/// 章节窗口，1 起始、两端包含，作用于按时间正序排列后的章节列表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterWindow {
    pub from: usize,
    pub to: usize,
}

impl ChapterWindow {
    pub fn new(from: usize, to: usize) -> Result<Self, String> {
        if from == 0 {
            return Err("章节编号从 1 开始".to_string());
        }
        if from > to {
            return Err(format!("无效的章节范围: {}:{}", from, to));
        }
        Ok(Self { from, to })
    }

    /// 超出末尾的部分会被截掉
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.from - 1)
            .take(self.to - self.from + 1)
            .collect()
    }
}

impl FromStr for ChapterWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| format!("章节范围格式应为 A:B，实际为 '{}'", s))?;
        let from = a.trim().parse().map_err(|_| format!("无效的章节编号: '{}'", a))?;
        let to = b.trim().parse().map_err(|_| format!("无效的章节编号: '{}'", b))?;
        ChapterWindow::new(from, to)
    }
}

impl fmt::Display for ChapterWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

impl<'de> Deserialize<'de> for ChapterWindow {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: Url,
    pub from_page: u32,
    pub to_page: u32,
    pub chapter_window: Option<ChapterWindow>,
    pub output: OutputMode,
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    /// 每次请求之后的等待时间
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub image_user_agent: String,
    /// 下载图片时带上的 Referer，为空时使用 base_url
    pub image_referer: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            from_page: 1,
            to_page: 1,
            chapter_window: None,
            output: OutputMode::Tree,
            output_dir: PathBuf::from("comics"),
            csv_path: PathBuf::from("comics.csv"),
            request_delay_ms: 500,
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            image_user_agent: DEFAULT_IMAGE_USER_AGENT.to_string(),
            image_referer: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("默认站点地址应当合法")
}

impl CrawlConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件 {} 失败", path.display()))?;
        let config: CrawlConfig = serde_json::from_str(&text)
            .with_context(|| format!("配置文件 {} 格式错误", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.from_page == 0 {
            bail!("页码从 1 开始");
        }
        if self.from_page > self.to_page {
            bail!("无效的页码范围: {} > {}", self.from_page, self.to_page);
        }
        if !matches!(self.base_url.scheme(), "http" | "https") || self.base_url.host().is_none() {
            bail!("无效的站点地址: {}", self.base_url);
        }
        Ok(())
    }

    pub fn listing_url(&self, page: u32) -> String {
        let mut url = self.base_url.clone();
        url.set_query(Some(&format!("page={}", page)));
        url.into()
    }

    pub fn referer(&self) -> &str {
        self.image_referer.as_deref().unwrap_or(self.base_url.as_str())
    }
}
