use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::utils::time::start_of_day;

/// Placement of the daily display window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineConfig {
    /// Hour of the day the window opens at.
    pub start_hour: u32,
    /// Window length in hours.
    pub span_hours: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            start_hour: 6,
            span_hours: 18,
        }
    }
}

impl TimelineConfig {
    /// Window for the day `now` falls on.
    pub fn window_for(&self, now: DateTime<FixedOffset>) -> TimelineWindow {
        let start_hour = i64::from(self.start_hour.min(23));
        let span_hours = i64::from(self.span_hours.clamp(1, 48));
        TimelineWindow {
            start: start_of_day(now) + TimeDelta::hours(start_hour),
            duration: TimeDelta::hours(span_hours),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    pub start: DateTime<FixedOffset>,
    pub duration: TimeDelta,
}

impl TimelineWindow {
    pub fn new(start: DateTime<FixedOffset>, duration: TimeDelta) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + self.duration
    }
}
