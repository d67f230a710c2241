use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp permissively.
///
/// A trailing `Z` means `+00:00`. A timestamp without an offset is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }

    let normalized = match raw.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(rest) => format!("{}+00:00", rest),
        None => raw.to_string(),
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(ts);
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Render as `YYYY-MM-DDTHH:MM:SS[.ffffff]+HH:MM`, keeping the recorded offset.
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    if ts.timestamp_subsec_micros() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
    }
}

/// Minutes between two instants, rounded to one decimal place.
///
/// Rounds the exact binary value with ties to even, through decimal formatting.
pub fn elapsed_minutes(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> f64 {
    let minutes = (*end - *start).num_milliseconds() as f64 / 60_000.0;
    format!("{:.1}", minutes).parse().unwrap_or(minutes)
}
