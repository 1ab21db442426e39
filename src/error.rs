use std::path::PathBuf;
use thiserror::Error;

/// 解析阶段的错误：选择器未命中、数字或日期格式不对
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("字段 '{field}' 不是有效的数字: '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("无法解析时间 '{input}'，出错的部分: '{token}'")]
    InvalidTimestamp { token: String, input: String },
    #[error("未知的时间单位: '{unit}'")]
    UnknownTimeUnit { unit: String },
    #[error("未找到元素: {selector}")]
    MissingElement { selector: String },
    #[error("元素 {selector} 缺少属性 '{attr}'")]
    MissingAttribute { attr: String, selector: String },
    #[error("字段 '{field}' 为空")]
    EmptyField { field: String },
}

impl ParseError {
    pub fn missing(selector: &str) -> Self {
        ParseError::MissingElement { selector: selector.to_string() }
    }

    pub fn missing_attr(attr: &str, selector: &str) -> Self {
        ParseError::MissingAttribute {
            attr: attr.to_string(),
            selector: selector.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("请求失败 {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status}: {url}")]
    Status { url: String, status: u16 },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("写入 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io { path: path.into(), source }
    }

    /// 文件系统错误会中止当前漫画
    pub fn is_io(&self) -> bool {
        matches!(self, ScrapeError::Io { .. })
    }
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
