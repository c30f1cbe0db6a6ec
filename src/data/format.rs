//! Human-readable formatting for byte counts, uptimes, timestamps and counters.
//!
//! Everything here is pure and allocation-light so the renderers can call it
//! on every frame.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count using binary (1024) steps, e.g. 1536 -> "1.5 KB".
///
/// One decimal place is kept only when it is non-zero, so 1024 renders as
/// "1 KB". Values beyond the terabyte range stay in TB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, BYTE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, BYTE_UNITS[unit])
    }
}

/// Format an uptime as days, hours and minutes. Seconds are truncated.
///
/// `format_uptime(90061)` is `"1d 1h 1m"`.
pub fn format_uptime(seconds: u64) -> String {
    let (days, hours, minutes) = split_uptime(seconds);
    format!("{}d {}h {}m", days, hours, minutes)
}

/// Compact uptime for list rows: only the two most significant units.
pub fn format_uptime_compact(seconds: u64) -> String {
    let (days, hours, minutes) = split_uptime(seconds);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn split_uptime(seconds: u64) -> (u64, u64, u64) {
    (seconds / 86_400, (seconds % 86_400) / 3_600, (seconds % 3_600) / 60)
}

/// Format an optional percentage with one decimal, "N/A" when absent.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "N/A".to_string(),
    }
}

/// Format a counter with thousands separators, e.g. 1234567 -> "1,234,567".
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Short time-of-day label for chart axes in the given time zone.
pub fn format_time_label<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format("%H:%M:%S").to_string()
}

/// Full local date and time, used for "last updated" lines.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_bytes(3 * 1024u64.pow(5)), "3072 TB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90_061), "1d 1h 1m");
        assert_eq!(format_uptime(59), "0d 0h 0m");
    }

    #[test]
    fn test_format_uptime_compact() {
        assert_eq!(format_uptime_compact(90_061), "1d 1h");
        assert_eq!(format_uptime_compact(3_660), "1h 1m");
        assert_eq!(format_uptime_compact(120), "2m");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(42.345)), "42.3%");
        assert_eq!(format_percent(None), "N/A");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_time_label_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 7, 5, 9).unwrap();
        assert_eq!(format_time_label(&ts, &Utc), "07:05:09");
    }
}
