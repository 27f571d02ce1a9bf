use chrono::{DateTime, Utc};

/// Case-insensitive substring test. An empty needle always matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a timestamp for listings, e.g. "Mar 01, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Like `format_date`, with a placeholder for missing values
pub fn format_optional_date(date: Option<&DateTime<Utc>>, default: &str) -> String {
    date.map(format_date).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Web Hosting", "host"));
        assert!(contains_ignore_case("Web Hosting", "WEB"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Web Hosting", "cloud"));
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Migración", 6), "Mig...");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(format_date(&date), "Mar 01, 2024");
        assert_eq!(format_optional_date(Some(&date), "-"), "Mar 01, 2024");
        assert_eq!(format_optional_date(None, "-"), "-");
    }
}
