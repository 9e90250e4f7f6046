use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Truncate a string to a maximum number of characters, adding an
/// ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Hours with at most one decimal, dropping a trailing ".0".
pub fn format_hours(hours: f64) -> String {
    let rounded = (hours * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Parse a server timestamp. The backend emits naive ISO strings, with or
/// without fractional seconds; RFC 3339 and bare dates are accepted too.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    match parse_timestamp(date) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None if date.len() >= 10 => date.chars().take(10).collect(),
        None => date.to_string(),
    }
}

pub fn format_datetime(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
        None => value.to_string(),
    }
}

pub fn format_optional_date(value: &Option<String>) -> String {
    value.as_deref().map(format_date).unwrap_or_else(|| "-".to_string())
}

/// Human-readable byte count ("512 B", "1.5 KB", "3.2 MB").
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_fee(fee: Option<f64>) -> String {
    match fee {
        Some(f) if f > 0.0 => format!("{:.2}", f),
        _ => "free".to_string(),
    }
}

/// Case-insensitive comparison for sorting names.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Case-insensitive substring match for list filters. An empty needle
/// matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Öğrenci profili", 6), "Öğr...");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(40.0), "40");
        assert_eq!(format_hours(40.5), "40.5");
        assert_eq!(format_hours(12.345), "12.3");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2026-03-02T19:00:00").is_some());
        assert!(parse_timestamp("2026-03-02T19:00:00.123456").is_some());
        assert!(parse_timestamp("2026-03-02T19:00:00+03:00").is_some());
        assert!(parse_timestamp("2026-03-02").is_some());
        assert!(parse_timestamp("soon").is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-03-02T19:00:00"), "Mar 02, 2026");
        assert_eq!(format_datetime("2026-03-02T19:05:00"), "Mar 02, 2026 19:05");
        assert_eq!(format_date("TBD"), "TBD");
        assert_eq!(format_optional_date(&None), "-");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(cmp_ignore_case("alice", "Bob"), Ordering::Less);
        assert!(contains_ignore_case("Wing Tsun", "tsun"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Escrima", "wing"));
    }
}
