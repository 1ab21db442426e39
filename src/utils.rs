use std::path::Path;
use url::Url;

/// 把标题、章节名转换成可以安全用作目录名的字符串
pub fn sanitize_path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim().trim_matches('.').trim();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 把站点上的链接补全为绝对地址；`//host/a.jpg` 统一用 https，其余按 `base_url` 拼接
pub fn resolve_url(base_url: &Url, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else if url.starts_with("//") {
        Some(format!("https:{}", url))
    } else {
        base_url.join(url).ok().map(|u| u.to_string())
    }
}

/// 从URL中提取图片扩展名，默认 jpg
pub fn image_extension(image_url: &str) -> String {
    let path = image_url.split(['?', '#']).next().unwrap_or(image_url);
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}
