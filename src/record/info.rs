use std::collections::BTreeMap;

/// 信息块里出现的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    Author,
    Categories,
    Status,
    Views,
    Follows,
    Comments,
    LastUpdate,
}

impl InfoField {
    pub const ALL: [InfoField; 7] = [
        InfoField::Author,
        InfoField::Categories,
        InfoField::Status,
        InfoField::Views,
        InfoField::Follows,
        InfoField::Comments,
        InfoField::LastUpdate,
    ];

    /// 站点上的标签文字
    pub fn label(&self) -> &'static str {
        match self {
            InfoField::Author => "Tác giả",
            InfoField::Categories => "Thể loại",
            InfoField::Status => "Tình trạng",
            InfoField::Views => "Lượt xem",
            InfoField::Follows => "Theo dõi",
            InfoField::Comments => "Bình luận",
            InfoField::LastUpdate => "Ngày cập nhật",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label.trim())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoBlock {
    pub fields: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

impl InfoBlock {
    pub fn get(&self, field: InfoField) -> Option<&str> {
        self.fields.get(field.label()).map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, field: InfoField, default: &'a str) -> &'a str {
        self.get(field).unwrap_or(default)
    }
}

/// 解析 `.message_main` 里的文字块。
///
/// 去掉开头的一个换行后按空行切分，每段在第一个 `:` 处分成键和值；
/// 值里如果还有 `:`，剩下的部分直接拼接（不加分隔符）。
/// 没有 `:` 的段落会被跳过并记录警告。
pub fn parse_info_block(raw_text: &str) -> InfoBlock {
    let text = raw_text.strip_prefix('\n').unwrap_or(raw_text);
    let mut block = InfoBlock::default();

    for entry in text.split("\n\n") {
        let entry = entry.trim_end_matches('\n');
        if entry.trim().is_empty() {
            continue;
        }

        let mut parts = entry.split(':');
        let key = parts.next().unwrap_or_default().trim();
        let rest: Vec<&str> = parts.collect();

        if rest.is_empty() || key.is_empty() {
            let warning = format!("无法解析信息条目: {:?}", entry);
            log::warn!("{}", warning);
            block.warnings.push(warning);
            continue;
        }

        block.fields.insert(key.to_string(), rest.concat().trim().to_string());
    }

    block
}
