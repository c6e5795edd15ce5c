//! Display formatting shared by every surface that renders tickets.

use chrono::{DateTime, Utc};

/// Layout used wherever a ticket timestamp is shown to a user.
pub const TIMESTAMP_DISPLAY: &str = "%d/%m/%Y %H:%M";

pub fn timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_DISPLAY).to_string()
}

/// Renders an elapsed duration the way ticket age is displayed: bare seconds
/// under a minute, then the two most significant units (`3h 12m`, `2d 4h`).
pub fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - since).num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
