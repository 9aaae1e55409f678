use chrono::NaiveDateTime;

pub const TITLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const VERSION_TIME_FORMAT: &str = "%H:%M:%S";

/// Pretty-prints `raw` when it is JSON, otherwise returns it untouched.
///
/// Key order and number text are kept as encoded.
pub fn format_content(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_owned()),
        Err(_) => raw.to_owned(),
    }
}

pub fn version_title(step: &str, index: u32, first_created_at: NaiveDateTime) -> String {
    format!(
        "{step} v{index} ({})",
        first_created_at.format(TITLE_TIMESTAMP_FORMAT)
    )
}

pub fn version_label(index: u32, created_at: NaiveDateTime) -> String {
    format!("v{index} ({})", created_at.format(VERSION_TIME_FORMAT))
}

pub fn format_size_kb(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Single-line preview of an artifact body, clipped to `limit` characters.
pub fn content_preview(content: &str, limit: usize) -> Option<String> {
    let text = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() || limit == 0 {
        return None;
    }
    if text.chars().count() > limit {
        let clipped: String = text.chars().take(limit).collect();
        return Some(format!("{clipped}..."));
    }
    Some(text)
}
