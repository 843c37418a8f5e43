//! Task and interval records as persisted in the tasks file.

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::span;

pub const DEFAULT_TASK_NAME: &str = "New task";
pub const DEFAULT_TASK_COLOR: &str = "#888888";

fn default_color() -> String {
    DEFAULT_TASK_COLOR.to_string()
}

/// One timing session of a task. `task_id` is a lookup key into the store's
/// index, never an owning reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Interval {
    pub task_id: Uuid,
    pub start: DateTime<FixedOffset>,
    #[serde(with = "span")]
    pub duration: TimeDelta,
    pub is_finalized: bool,
}

impl Interval {
    pub fn open(task_id: Uuid, start: DateTime<FixedOffset>) -> Self {
        Self {
            task_id,
            start,
            duration: TimeDelta::zero(),
            is_finalized: false,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.is_finalized
    }

    /// Duration as of `now`: the stored value once finalized, the live
    /// projection `now - start` while open.
    pub fn elapsed(&self, now: DateTime<FixedOffset>) -> TimeDelta {
        if self.is_finalized {
            self.duration
        } else {
            (now - self.start).max(TimeDelta::zero())
        }
    }

    pub fn end(&self, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.start + self.elapsed(now)
    }

    /// Portion of this interval falling inside `[from, to)`.
    pub fn overlap(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> TimeDelta {
        let start = self.start.max(from);
        let end = self.end(now).min(to);
        if end <= start {
            TimeDelta::zero()
        } else {
            end - start
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color_hex: String,
    #[serde(default)]
    pub intervals: Vec<Interval>,
}

impl Task {
    pub fn new(name: impl Into<String>, color_hex: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color_hex: color_hex.into(),
            intervals: Vec::new(),
        }
    }

    /// The trailing interval, if it is still open.
    pub fn open_interval(&self) -> Option<&Interval> {
        self.intervals.last().filter(|interval| interval.is_open())
    }

    pub fn open_interval_mut(&mut self) -> Option<&mut Interval> {
        self.intervals.last_mut().filter(|interval| interval.is_open())
    }
}
