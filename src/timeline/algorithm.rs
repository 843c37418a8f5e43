use chrono::{DateTime, FixedOffset, TimeDelta};
use uuid::Uuid;

use crate::models::{Interval, Rgba, Task};
use crate::store::{IntegrityError, TaskStore};
use crate::timeline::config::TimelineWindow;
use crate::utils::time::format_hours_minutes;

/// A labeled run of the display window: either one task's activity or idle
/// time between activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineBlock {
    pub start: DateTime<FixedOffset>,
    pub duration: TimeDelta,
    pub is_idle: bool,
    pub label: String,
    pub color: Rgba,
    pub task_id: Option<Uuid>,
}

impl TimelineBlock {
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + self.duration
    }

    pub(crate) fn idle(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        window: &TimelineWindow,
    ) -> Self {
        Self {
            start,
            duration: end - start,
            is_idle: true,
            label: format!(
                "Idle\n{} - {}",
                clock_in(start, window),
                clock_in(end, window)
            ),
            color: Rgba::IDLE,
            task_id: None,
        }
    }

    pub(crate) fn active(
        task: &Task,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        window: &TimelineWindow,
    ) -> Self {
        let duration = end - start;
        Self {
            start,
            duration,
            is_idle: false,
            label: format!(
                "{}\n{} - {}\n{}",
                task.name,
                clock_in(start, window),
                clock_in(end, window),
                format_hours_minutes(duration)
            ),
            color: Rgba::from_hex_or_fallback(&task.color_hex),
            task_id: Some(task.id),
        }
    }
}

fn clock_in(t: DateTime<FixedOffset>, window: &TimelineWindow) -> String {
    t.with_timezone(window.start.offset()).format("%H:%M").to_string()
}

/// Builds the gap-free block sequence covering `window` from every interval
/// in the store. Open intervals extend to `now`.
///
/// Intervals are sorted here; the store only guarantees append order. Where
/// records overlap, the later one is clipped to start where the earlier one
/// ended, so blocks never overlap.
pub fn build_timeline(
    store: &TaskStore,
    window: &TimelineWindow,
    now: DateTime<FixedOffset>,
) -> Result<Vec<TimelineBlock>, IntegrityError> {
    let window_end = window.end();

    let mut intervals: Vec<&Interval> = store
        .all_intervals()
        .filter(|interval| interval.start < window_end && interval.end(now) > window.start)
        .collect();
    intervals.sort_by_key(|interval| interval.start);

    let mut blocks = Vec::with_capacity(intervals.len() * 2 + 1);
    let mut cursor = window.start;

    for interval in intervals {
        let task = store.resolve(interval.task_id)?;

        let start = interval.start.max(cursor);
        let end = interval.end(now).min(window_end);
        if end <= start {
            continue;
        }

        if start > cursor {
            blocks.push(TimelineBlock::idle(cursor, start, window));
        }
        blocks.push(TimelineBlock::active(task, start, end, window));
        cursor = end;
    }

    if cursor < window_end {
        blocks.push(TimelineBlock::idle(cursor, window_end, window));
    }

    Ok(blocks)
}
