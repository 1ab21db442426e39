use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// 日期统一输出为 DD/MM/YYYY
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// 浏览/关注/评论数。`Unknown` 表示站点上没有这个字段，和 0 区分开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Count {
    Known(u64),
    #[default]
    Unknown,
}

impl Count {
    /// 解析 "1.234.567" 这种以点分隔千位的数字：第一组 1~3 位，之后每组正好 3 位
    pub fn parse_grouped(field: &str, raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        let invalid = || ParseError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        };

        let mut digits = String::with_capacity(raw.len());
        for (i, group) in raw.split('.').enumerate() {
            let width_ok = match i {
                0 => group.len() <= 3 || !raw.contains('.'),
                _ => group.len() == 3,
            };
            if group.is_empty() || !width_ok || !group.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.push_str(group);
        }

        digits.parse::<u64>().map(Count::Known).map_err(|_| invalid())
    }

    pub fn value(&self) -> Option<u64> {
        match self {
            Count::Known(n) => Some(*n),
            Count::Unknown => None,
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Known(n) => write!(f, "{}", n),
            Count::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for Count {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(Count::Unknown);
        }
        s.parse::<u64>().map(Count::Known).map_err(|_| ParseError::InvalidNumber {
            field: "count".to_string(),
            value: s.to_string(),
        })
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Count {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 下载下来的图片内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String, // 站点给的页面 id，同时作为文件名
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
    pub url: String,
    pub pages: Vec<Page>,
}

impl Chapter {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comic {
    pub title: String,
    pub author: String,
    pub categories: Option<String>,
    pub status: Option<String>,
    pub n_views: Count,
    pub n_follows: Count,
    pub n_comments: Count,
    pub last_update_date: Option<NaiveDate>,
    pub introduction: String,
    pub url: String,
    pub cover_url: Option<String>,
    pub latest_chapter: Option<String>, // 站点列表中最新的一章
    pub chapters: Vec<Chapter>,
}

impl Comic {
    pub fn add_chapters(&mut self, chapters: impl IntoIterator<Item = Chapter>) {
        self.chapters.extend(chapters);
    }

    pub fn last_update_text(&self) -> String {
        self.last_update_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

/// info.txt 的内容
impl fmt::Display for Comic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Categories: {}", self.categories.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "Status: {}", self.status.as_deref().unwrap_or("unknown"))?;
        writeln!(
            f,
            "Views: {} - Follows: {} - Comments: {}",
            self.n_views, self.n_follows, self.n_comments
        )?;
        match self.last_update_date {
            Some(_) => writeln!(f, "Last update date: {}", self.last_update_text())?,
            None => writeln!(f, "Last update date: unknown")?,
        }
        writeln!(f, "Link: {}", self.url)?;
        writeln!(f)?;
        writeln!(f, "{}", self.introduction)
    }
}
