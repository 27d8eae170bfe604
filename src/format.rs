//! Presentation helpers shared by the CLI and the exporters.

use chrono::{DateTime, NaiveDateTime};

use crate::report::metrics::UrgencyLevel;
use crate::report::{ColorTag, ProcessingTime};

/// Placeholder for values the report did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Seconds as `850ms`, `12.4s` or `2m 5s`.
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else {
        let minutes = (seconds / 60.0).floor() as u64;
        format!("{minutes}m {:.0}s", seconds % 60.0)
    }
}

/// Processing time for display; unreadable text is shown as sent.
pub fn format_processing_time(time: Option<&ProcessingTime>) -> String {
    match time {
        None => NOT_AVAILABLE.to_string(),
        Some(ProcessingTime::Seconds(s)) if *s == 0.0 => NOT_AVAILABLE.to_string(),
        Some(ProcessingTime::Text(t)) if t.is_empty() => NOT_AVAILABLE.to_string(),
        Some(time) => match time.seconds() {
            Some(seconds) => format_seconds(seconds),
            None => time.to_string(),
        },
    }
}

/// How quickly the backend finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    Slow,
}

impl PerformanceRating {
    /// Unknown durations rate as slow.
    pub fn from_time(time: Option<&ProcessingTime>) -> Self {
        match time.and_then(ProcessingTime::seconds) {
            Some(s) if s < 15.0 => Self::Excellent,
            Some(s) if s < 25.0 => Self::Good,
            Some(s) if s < 40.0 => Self::Average,
            _ => Self::Slow,
        }
    }

    pub fn color(self) -> ColorTag {
        match self {
            Self::Excellent => ColorTag::Green,
            Self::Good => ColorTag::Blue,
            Self::Average => ColorTag::Yellow,
            Self::Slow => ColorTag::Orange,
        }
    }
}

impl std::fmt::Display for PerformanceRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Average => write!(f, "Average"),
            Self::Slow => write!(f, "Slow"),
        }
    }
}

pub fn urgency_label(score: Option<u64>) -> String {
    score.map_or_else(
        || "Unknown".to_string(),
        |s| UrgencyLevel::from_score(s).to_string(),
    )
}

/// First `max_chars` characters, trimmed, with `...` appended when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", text[..cut].trim()),
    }
}

/// Thousands-separated count, or `N/A`.
pub fn format_number(n: Option<u64>) -> String {
    let Some(n) = n else {
        return NOT_AVAILABLE.to_string();
    };
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// ISO-8601 timestamp as `Oct 18, 2026, 09:05 AM`; unparseable input is
/// returned as-is.
pub fn format_timestamp(timestamp: Option<&str>) -> String {
    let Some(ts) = timestamp.filter(|t| !t.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.format(TIMESTAMP_FORMAT).to_string();
    }
    match NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => ts.to_string(),
    }
}

/// Unix seconds (UTC) in the same format as [`format_timestamp`].
pub fn format_unix(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map_or_else(|| secs.to_string(), |dt| dt.format(TIMESTAMP_FORMAT).to_string())
}
