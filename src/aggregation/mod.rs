//! Totals and proportions derived from the store. Recomputed every tick,
//! never cached.

mod types;

pub use types::{AggregateSnapshot, BarSegment, TaskSummary};

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::models::{Rgba, Task};
use crate::store::TaskStore;
use crate::utils::time::start_of_day;

/// Sum of every interval, the open one projected to `now`.
pub fn total_time(task: &Task, now: DateTime<FixedOffset>) -> TimeDelta {
    task.intervals
        .iter()
        .fold(TimeDelta::zero(), |sum, interval| sum + interval.elapsed(now))
}

/// Time spent inside `[day_start, day_start + 24h)`. Intervals straddling
/// midnight count only their in-day part.
pub fn daily_total(
    task: &Task,
    day_start: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> TimeDelta {
    let day_end = day_start + TimeDelta::days(1);
    task.intervals.iter().fold(TimeDelta::zero(), |sum, interval| {
        sum + interval.overlap(day_start, day_end, now)
    })
}

pub fn grand_total(tasks: &[Task], now: DateTime<FixedOffset>) -> TimeDelta {
    tasks
        .iter()
        .fold(TimeDelta::zero(), |sum, task| sum + total_time(task, now))
}

/// `total / grand_total`, 0 when nothing was tracked.
pub fn progress(task: &Task, tasks: &[Task], now: DateTime<FixedOffset>) -> f64 {
    ratio(total_time(task, now), grand_total(tasks, now))
}

/// `daily_total / Σ daily_total`, 0 when nothing was tracked today.
pub fn daily_progress(
    task: &Task,
    tasks: &[Task],
    day_start: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> f64 {
    let day = tasks
        .iter()
        .fold(TimeDelta::zero(), |sum, t| sum + daily_total(t, day_start, now));
    ratio(daily_total(task, day_start, now), day)
}

fn ratio(part: TimeDelta, whole: TimeDelta) -> f64 {
    if whole <= TimeDelta::zero() {
        return 0.0;
    }
    part.num_milliseconds() as f64 / whole.num_milliseconds().max(1) as f64
}

/// All figures for `now`'s day in one pass over the store.
pub fn summarize(store: &TaskStore, now: DateTime<FixedOffset>) -> AggregateSnapshot {
    let day_start = start_of_day(now);

    let totals: Vec<(TimeDelta, TimeDelta)> = store
        .tasks()
        .iter()
        .map(|task| (total_time(task, now), daily_total(task, day_start, now)))
        .collect();
    let grand_total = totals.iter().fold(TimeDelta::zero(), |sum, (t, _)| sum + *t);
    let daily_grand_total = totals.iter().fold(TimeDelta::zero(), |sum, (_, d)| sum + *d);

    let tasks = store
        .tasks()
        .iter()
        .zip(totals)
        .map(|(task, (total, daily))| TaskSummary {
            task_id: task.id,
            name: task.name.clone(),
            color: Rgba::from_hex_or_fallback(&task.color_hex),
            total,
            daily_total: daily,
            progress: ratio(total, grand_total),
            daily_progress: ratio(daily, daily_grand_total),
        })
        .collect();

    AggregateSnapshot {
        tasks,
        grand_total,
        daily_grand_total,
    }
}

/// Segments for every task with time today, in task order.
pub fn distribution_bar(snapshot: &AggregateSnapshot) -> Vec<BarSegment> {
    snapshot
        .tasks
        .iter()
        .filter(|summary| summary.daily_total > TimeDelta::zero())
        .map(|summary| BarSegment {
            task_id: summary.task_id,
            color: summary.color,
            weight: summary.daily_progress,
        })
        .collect()
}
