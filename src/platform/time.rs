//! Wall-clock access and timestamp labels

use std::cell::Cell;

/// Source of epoch-millisecond timestamps
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Real wall clock (`Date.now()` on web, `SystemTime` on native)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

const MS_PER_MIN: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MIN;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Format a save timestamp relative to `now_ms`
///
/// Falls back to an absolute `m/d/yy` date (UTC) once the save is a week old.
pub fn format_age(saved_at_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(saved_at_ms);

    if diff >= MS_PER_DAY {
        let days = diff / MS_PER_DAY;
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            chrono::DateTime::from_timestamp_millis(saved_at_ms)
                .map(|date| date.format("%-m/%-d/%y").to_string())
                .unwrap_or_else(|| "unknown time".to_string())
        }
    } else if diff >= MS_PER_HOUR {
        let hours = diff / MS_PER_HOUR;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff >= MS_PER_MIN {
        let mins = diff / MS_PER_MIN;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        // Includes timestamps slightly in the future (clock skew)
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_format_age_relative() {
        let now = 10 * MS_PER_DAY;
        assert_eq!(format_age(now - 5_000, now), "Just now");
        assert_eq!(format_age(now + 5_000, now), "Just now");
        assert_eq!(format_age(now - MS_PER_MIN, now), "1 min ago");
        assert_eq!(format_age(now - 5 * MS_PER_MIN, now), "5 mins ago");
        assert_eq!(format_age(now - MS_PER_HOUR, now), "1 hour ago");
        assert_eq!(format_age(now - 3 * MS_PER_HOUR, now), "3 hours ago");
        assert_eq!(format_age(now - MS_PER_DAY, now), "Yesterday");
        assert_eq!(format_age(now - 4 * MS_PER_DAY, now), "4 days ago");
    }

    #[test]
    fn test_format_age_absolute_date() {
        // 2024-03-05T12:00:00Z
        let saved = 1_709_640_000_000;
        let now = saved + 30 * MS_PER_DAY;
        assert_eq!(format_age(saved, now), "3/5/24");
    }

    #[test]
    fn test_format_age_out_of_range_timestamps() {
        let now = 1_700_000_000_000;
        assert_eq!(format_age(-9_223_372_036_854_775_000, now), "unknown time");
        assert_eq!(format_age(i64::MIN, now), "unknown time");
        assert_eq!(format_age(i64::MAX, now), "Just now");
        assert_eq!(format_age(i64::MAX, i64::MIN), "Just now");
    }
}
