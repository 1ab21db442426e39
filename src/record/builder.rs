use chrono::NaiveDateTime;

use super::info::{InfoBlock, InfoField};
use super::time;
use crate::error::ParseError;
use crate::models::{Chapter, Comic, Count};

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// 由列表卡片里的原始字段组装 `Comic`
pub struct RecordBuilder {
    now: NaiveDateTime,
}

impl RecordBuilder {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn now() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    pub fn build(
        &self,
        title: &str,
        introduction: &str,
        info: &InfoBlock,
        cover_url: Option<String>,
        chapters: Vec<Chapter>,
    ) -> Result<Comic, ParseError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ParseError::EmptyField { field: "title".to_string() });
        }

        let last_update_date = info
            .get(InfoField::LastUpdate)
            .map(|raw| time::normalize(raw, self.now))
            .transpose()?;

        Ok(Comic {
            title: title.to_string(),
            author: info.get_or(InfoField::Author, UNKNOWN_AUTHOR).to_string(),
            categories: info.get(InfoField::Categories).map(str::to_string),
            status: info.get(InfoField::Status).map(str::to_string),
            n_views: count(info, InfoField::Views)?,
            n_follows: count(info, InfoField::Follows)?,
            n_comments: count(info, InfoField::Comments)?,
            last_update_date,
            introduction: introduction.trim().to_string(),
            url: String::new(),
            cover_url,
            latest_chapter: None,
            chapters,
        })
    }
}

fn count(info: &InfoBlock, field: InfoField) -> Result<Count, ParseError> {
    match info.get(field) {
        Some(raw) => Count::parse_grouped(field.label(), raw),
        None => Ok(Count::Unknown),
    }
}
