use chrono::{Local, TimeZone};

/// Get the current time in seconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Get the current time in seconds since the UNIX epoch
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| (perf.time_origin() + perf.now()) / 1000.0)
        .unwrap_or(0.0)
}

/// Milliseconds since the UNIX epoch, the unit documents are stamped with
pub fn now_millis() -> i64 {
    (current_time_secs() * 1000.0) as i64
}

/// Human-friendly age of a timestamp: "just now", "5 minutes ago",
/// "3 hours ago", or a short local date after a day.
pub fn relative_time(created_ms: i64, now_ms: i64) -> String {
    let minutes = (now_ms - created_ms).max(0) / 60_000;
    match minutes {
        0 => "just now".to_owned(),
        1 => "1 minute ago".to_owned(),
        2..=59 => format!("{minutes} minutes ago"),
        60..=119 => "1 hour ago".to_owned(),
        120..=1439 => format!("{} hours ago", minutes / 60),
        _ => Local
            .timestamp_millis_opt(created_ms)
            .single()
            .map(|date| date.format("%b %-d, %H:%M").to_string())
            .unwrap_or_else(|| "a while ago".to_owned()),
    }
}
