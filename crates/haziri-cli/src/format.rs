//! Display helpers for table output.

/// Format a phone number for display.
/// Ten-digit numbers are split 5+5; a leading 91 country code is kept as +91.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!("{} {}", &digits[0..5], &digits[5..10]),
        12 if digits.starts_with("91") => {
            format!("+91 {} {}", &digits[2..7], &digits[7..12])
        }
        _ => phone.to_string(), // Unknown shape, leave as-is
    }
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

/// Format a date or timestamp as "Oct 20, 2025"
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Some(day) = date
        .get(..10)
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    {
        day.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Format a timestamp as "Oct 20, 2025 09:30", dropping seconds
pub fn format_timestamp(timestamp: &str) -> String {
    match timestamp.get(11..16) {
        Some(time) if timestamp.as_bytes().get(10) == Some(&b'T') => {
            format!("{} {}", format_date(timestamp), time)
        }
        _ => format_date(timestamp),
    }
}

/// Format hours worked, e.g. "8h 45m"
pub fn format_worked(worked: Option<chrono::Duration>) -> String {
    match worked {
        Some(d) if d >= chrono::Duration::zero() => {
            format!("{}h {:02}m", d.num_hours(), d.num_minutes() % 60)
        }
        _ => "-".to_string(),
    }
}

/// Format a leave day count without a trailing ".0"
pub fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{}", days as i64)
    } else {
        format!("{:.1}", days)
    }
}
