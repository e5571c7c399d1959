// Utility functions
use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses a timestamp the way the backend may send it: RFC 3339, RFC 2822
/// (Flask's default JSON date format) or a naive ISO datetime taken as UTC.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    let s = date_str.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Formats an amount in rupees with Indian digit grouping (`₹1,23,456`),
/// at most two fraction digits and none when the amount is whole.
pub fn format_price(price: f64) -> String {
    let paise = (price.abs() * 100.0).round() as u64;
    let whole = paise / 100;
    let fraction = paise % 100;

    let digits = whole.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    };

    let sign = if price < 0.0 && paise > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{sign}₹{grouped}"),
        f if f % 10 == 0 => format!("{sign}₹{grouped}.{}", f / 10),
        f => format!("{sign}₹{grouped}.{f:02}"),
    }
}
