use chrono::TimeDelta;
use uuid::Uuid;

use crate::models::Rgba;

/// Per-task figures for one refresh tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSummary {
    pub task_id: Uuid,
    pub name: String,
    pub color: Rgba,
    pub total: TimeDelta,
    pub daily_total: TimeDelta,
    /// Share of the all-time grand total, in `[0, 1]`.
    pub progress: f64,
    /// Share of today's grand total, in `[0, 1]`.
    pub daily_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateSnapshot {
    pub tasks: Vec<TaskSummary>,
    pub grand_total: TimeDelta,
    pub daily_grand_total: TimeDelta,
}

/// One run of the distribution bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub task_id: Uuid,
    pub color: Rgba,
    pub weight: f64,
}
