use chrono::{DateTime, Local};

/// Keeps the first `max_chars` characters, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_owned(),
    }
}

pub fn format_expiration(expiration_date: Option<f64>) -> String {
    let Some(seconds) = expiration_date else {
        return "Session".to_owned();
    };

    let whole = seconds.trunc() as i64;
    let nanos = (seconds.fract().abs() * 1e9) as u32;
    match DateTime::from_timestamp(whole, nanos) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("{seconds}"),
    }
}

pub fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
