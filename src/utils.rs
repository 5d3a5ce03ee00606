// src/utils.rs

use crate::constants;
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::sync::LazyLock;

pub static BVID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^BV1[0-9A-Za-z]{9}$").unwrap());
static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const MAX_FILENAME_PART_BYTES: usize = 80;

pub fn is_bvid(text: &str) -> bool {
    BVID_PATTERN.is_match(text)
}

/// 将 Unix 时间戳格式化为北京时间
pub fn format_timestamp(ts: i64) -> String {
    let Some(offset) = FixedOffset::east_opt(constants::CST_OFFSET_SECS) else {
        return String::new();
    };
    DateTime::from_timestamp(ts, 0)
        .map(|dt| {
            dt.with_timezone(&offset)
                .format(constants::DISPLAY_TIME_FORMAT)
                .to_string()
        })
        .unwrap_or_default()
}

/// 秒数转为 "m:ss" 或 "h:mm:ss"
pub fn format_duration(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// 清理用于导出文件名的一段文本
pub fn sanitize_filename_part(name: &str) -> String {
    let mut name = ILLEGAL_CHARS_RE.replace_all(name.trim(), " ").into_owned();
    name = WHITESPACE_RE.replace_all(&name, "_").to_string();
    name = name
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string();
    if name.is_empty() {
        return "unnamed".to_string();
    }
    safe_truncate_utf8(&name, MAX_FILENAME_PART_BYTES).to_string()
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes { return s; }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) { i -= 1; }
    &s[..i]
}

/// 按显示宽度截断（非 ASCII 字符按 2 计）
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let char_width = |c: char| if c.is_ascii() { 1 } else { 2 };
    if text.chars().map(char_width).sum::<usize>() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += char_width(c);
        if width > budget {
            break;
        }
        end_pos = i + c.len_utf8();
    }
    format!("{}...", &text[..end_pos])
}
